//! Chat prompt templates.
//!
//! A prompt is a plain data structure: an ordered sequence of role-tagged
//! message templates with `{name}` placeholders, plus a slot where the
//! session's chat history is spliced in. Rendering is string substitution
//! over the provided variables.
//!
//! Each built-in message template starts with a literal newline before the
//! instruction/context text; the newline is part of the wire prompt shape.

use std::collections::HashMap;

use wikisage_core::types::{ChatTurn, Role};

/// One element of a chat prompt.
#[derive(Debug, Clone)]
pub enum PromptItem {
    /// A role-tagged message template with `{name}` placeholders.
    Message { role: Role, template: String },
    /// The slot where the session's prior turns are inserted.
    History,
}

/// An ordered sequence of prompt items, rendered into concrete turns.
#[derive(Debug, Clone)]
pub struct ChatPrompt {
    items: Vec<PromptItem>,
}

impl ChatPrompt {
    pub fn from_items(items: Vec<PromptItem>) -> Self {
        Self { items }
    }

    /// Render the prompt: substitute `vars` into every message template and
    /// splice `history` into the history slot.
    pub fn render(&self, vars: &HashMap<&str, String>, history: &[ChatTurn]) -> Vec<ChatTurn> {
        let mut turns = Vec::with_capacity(self.items.len() + history.len());
        for item in &self.items {
            match item {
                PromptItem::Message { role, template } => turns.push(ChatTurn {
                    role: *role,
                    text: substitute(template, vars),
                }),
                PromptItem::History => turns.extend_from_slice(history),
            }
        }
        turns
    }
}

/// Replace every `{name}` occurrence for the provided variables. Unknown
/// placeholders are left untouched.
fn substitute(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}

/// Prompt for the query-rewriting stage: instruction, prior turns, then the
/// new question.
pub fn contextualize_prompt(instruction: &str) -> ChatPrompt {
    ChatPrompt::from_items(vec![
        PromptItem::Message {
            role: Role::System,
            template: format!("\n{instruction}"),
        },
        PromptItem::History,
        PromptItem::Message {
            role: Role::Human,
            template: "\n{input}".into(),
        },
    ])
}

/// Prompt for the answer-synthesis stage: instruction, prior turns, the
/// context template (with retrieved sections stuffed into `{context}`),
/// then the original question.
pub fn synthesis_prompt(instruction: &str, context_prompt: &str) -> ChatPrompt {
    ChatPrompt::from_items(vec![
        PromptItem::Message {
            role: Role::System,
            template: format!("\n{instruction}"),
        },
        PromptItem::History,
        PromptItem::Message {
            role: Role::System,
            template: format!("\n{context_prompt}"),
        },
        PromptItem::Message {
            role: Role::Human,
            template: "\n{input}".into(),
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_substitute_known_and_unknown() {
        let v = vars(&[("input", "hello")]);
        assert_eq!(substitute("say {input} to {user}", &v), "say hello to {user}");
    }

    #[test]
    fn test_contextualize_render_shape() {
        let prompt = contextualize_prompt("You rewrite questions.");
        let history = vec![ChatTurn::human("earlier"), ChatTurn::ai("reply")];
        let v = vars(&[("input", "and now?")]);

        let turns = prompt.render(&v, &history);
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].role, Role::System);
        assert_eq!(turns[0].text, "\nYou rewrite questions.");
        assert_eq!(turns[1], ChatTurn::human("earlier"));
        assert_eq!(turns[2], ChatTurn::ai("reply"));
        assert_eq!(turns[3], ChatTurn::human("\nand now?"));
    }

    #[test]
    fn test_synthesis_render_stuffs_context() {
        let prompt = synthesis_prompt("Answer from the wiki.", "Context:\n{context}");
        let v = vars(&[
            ("input", "What is mining?"),
            ("context", "Wiki excerpt from URL: https://w/a#x\n\nMining\n\nDig."),
        ]);

        let turns = prompt.render(&v, &[]);
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1].role, Role::System);
        assert!(turns[1].text.starts_with("\nContext:\n"));
        assert!(turns[1].text.contains("Dig."));
        assert_eq!(turns[2].text, "\nWhat is mining?");
    }

    #[test]
    fn test_leading_newline_preserved() {
        let prompt = contextualize_prompt("inst");
        let turns = prompt.render(&vars(&[("input", "q")]), &[]);
        assert!(turns[0].text.starts_with('\n'));
        assert!(turns[1].text.starts_with('\n'));
    }

    #[test]
    fn test_empty_history_slot_renders_nothing() {
        let prompt = contextualize_prompt("inst");
        let turns = prompt.render(&vars(&[("input", "q")]), &[]);
        assert_eq!(turns.len(), 2);
    }

    #[test]
    fn test_aux_vars_reach_instruction_templates() {
        let prompt = contextualize_prompt("It is {time} and you talk to {user}.");
        let v = vars(&[
            ("input", "q"),
            ("time", "2024-05-01T10:00:00Z"),
            ("user", "sam"),
        ]);
        let turns = prompt.render(&v, &[]);
        assert_eq!(turns[0].text, "\nIt is 2024-05-01T10:00:00Z and you talk to sam.");
    }
}

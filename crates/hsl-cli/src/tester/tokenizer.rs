//! Minimal reference tokenizer over decoded bytecode.
//!
//! Executes the rule table directly: at each position, every rule of the
//! current state searches for its earliest match (rules are already in
//! priority order, so table order breaks ties), and the winning rule emits a
//! token and applies its state-stack effect. This is a development aid for
//! the `test` subcommand, not a production engine.

use hsl_bytecode::{Program, RuleAction, RuleEntry, SCOPE_NONE};
use regex_automata::meta::Regex;
use regex_automata::Input;

#[derive(Debug, thiserror::Error)]
pub enum TokenizerError {
    #[error("bytecode has no states")]
    EmptyProgram,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub scope: String,
    pub text: String,
}

pub struct Tokenizer<'p> {
    program: &'p Program,
    /// One compiled regex per regex-table entry. Patterns the engine cannot
    /// execute (Oniguruma extensions) stay `None` and their rules never
    /// match.
    regexes: Vec<Option<Regex>>,
}

impl<'p> Tokenizer<'p> {
    pub fn new(program: &'p Program) -> Result<Self, TokenizerError> {
        if program.state_table.is_empty() {
            return Err(TokenizerError::EmptyProgram);
        }

        let regexes = program
            .regex_table
            .iter()
            .map(|entry| {
                std::str::from_utf8(&entry.compiled)
                    .ok()
                    .and_then(|pattern| Regex::new(pattern).ok())
            })
            .collect();

        Ok(Self { program, regexes })
    }

    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut state_stack: Vec<u32> = vec![0];
        let mut scope_stack: Vec<u16> = Vec::new();
        let mut pos = 0usize;

        while pos < input.len() {
            let Some(&state_id) = state_stack.last() else {
                break;
            };
            let Some((rule, start, end)) = self.earliest_match(state_id, input, pos) else {
                break;
            };

            let text = &input[start..end];
            match rule.action {
                RuleAction::Match => {
                    self.emit(&mut tokens, rule, text, &scope_stack, input, start);
                }
                RuleAction::Transition => {
                    self.emit(&mut tokens, rule, text, &scope_stack, input, start);
                    if rule.next_state >= 0
                        && let Some(top) = state_stack.last_mut()
                    {
                        *top = rule.next_state as u32;
                    }
                }
                RuleAction::PushScope => {
                    self.emit(&mut tokens, rule, text, &scope_stack, input, start);
                    scope_stack.push(rule.scope_id);
                    if rule.next_state >= 0 {
                        state_stack.push(rule.next_state as u32);
                    }
                }
                RuleAction::PopScope => {
                    // Emit before popping: the closing delimiter still
                    // belongs to the region, and end captures emit their
                    // sub-tokens like any other rule's.
                    self.emit(&mut tokens, rule, text, &scope_stack, input, start);
                    scope_stack.pop();
                    if state_stack.len() > 1 {
                        state_stack.pop();
                    }
                }
            }

            // Zero-width matches (lookahead guards) must still advance.
            pos = if end > start {
                end
            } else {
                end + input[end..].chars().next().map_or(1, char::len_utf8)
            };
        }

        tokens
    }

    /// The earliest-starting match among the state's rules; ties go to the
    /// first rule in table order.
    fn earliest_match(
        &self,
        state_id: u32,
        input: &str,
        pos: usize,
    ) -> Option<(&RuleEntry, usize, usize)> {
        let state = &self.program.state_table[state_id as usize];
        let rules = &self.program.rule_table
            [state.rule_offset as usize..(state.rule_offset + state.rule_count as u32) as usize];

        let mut best: Option<(&RuleEntry, usize, usize)> = None;
        for rule in rules {
            let Some(re) = &self.regexes[rule.regex_id as usize] else {
                continue;
            };
            let Some(m) = re.find(Input::new(input).range(pos..)) else {
                continue;
            };
            if best.as_ref().is_none_or(|(_, start, _)| m.start() < *start) {
                best = Some((rule, m.start(), m.end()));
            }
        }
        best
    }

    /// Emit a token for the whole match, then one per named capture group.
    fn emit(
        &self,
        tokens: &mut Vec<Token>,
        rule: &RuleEntry,
        text: &str,
        scope_stack: &[u16],
        input: &str,
        start: usize,
    ) {
        let scope = if rule.scope_id != SCOPE_NONE {
            rule.scope_id
        } else if let Some(&top) = scope_stack.last() {
            top
        } else {
            SCOPE_NONE
        };
        tokens.push(Token {
            scope: self.scope_name(scope),
            text: text.to_owned(),
        });

        if rule.captures.is_empty() {
            return;
        }
        let Some(re) = &self.regexes[rule.regex_id as usize] else {
            return;
        };
        let mut caps = re.create_captures();
        re.captures(Input::new(input).range(start..), &mut caps);
        if !caps.is_match() {
            return;
        }
        for mapping in &rule.captures {
            let Some(span) = caps.get_group(mapping.group as usize) else {
                continue;
            };
            if span.start == span.end {
                continue;
            }
            tokens.push(Token {
                scope: self.scope_name(mapping.scope),
                text: input[span.start..span.end].to_owned(),
            });
        }
    }

    fn scope_name(&self, scope: u16) -> String {
        self.program
            .scope_name(scope)
            .unwrap_or_default()
            .to_owned()
    }
}

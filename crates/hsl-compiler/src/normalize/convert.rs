//! Rule lowering: grammar rules → states, transitions, and actions.
//!
//! Includes are expanded lazily while lowering so the expansion stack can
//! span nested pattern lists; the stack is an explicit ordered set keyed by
//! repository name (`$self` uses its own marker), entered before recursion
//! and exited after.

use indexmap::IndexSet;

use crate::diagnostics::Diagnostics;
use crate::grammar::{Captures, Grammar, IncludeTarget, MatchRule, Rule, SpanRule};
use crate::ir::{Action, ActionId, Machine, StackEffect, StateId, Transition};

use super::predicates;
use super::NormalizeError;

/// Marker used for `$self` on the expansion stack.
const SELF_KEY: &str = "$self";

/// Priority baseline; see the formula in `priority_of`.
const BASE_PRIORITY: u8 = 50;

pub(super) fn convert(
    grammar: &Grammar,
    diagnostics: &mut Diagnostics,
) -> Result<Machine, NormalizeError> {
    let mut converter = Converter {
        grammar,
        machine: Machine::new(),
        diagnostics,
        stack: IndexSet::new(),
    };

    // The initial state doubles as the context for top-level rules and is
    // always a valid termination point.
    let root = converter.machine.alloc_state(true);
    converter.lower_list(&grammar.patterns, root, 0)?;
    Ok(converter.machine)
}

struct Converter<'a> {
    grammar: &'a Grammar,
    machine: Machine,
    diagnostics: &'a mut Diagnostics,
    /// Active include expansions, in entry order.
    stack: IndexSet<String>,
}

impl Converter<'_> {
    fn lower_list(
        &mut self,
        rules: &[Rule],
        ctx: StateId,
        depth: u32,
    ) -> Result<(), NormalizeError> {
        for rule in rules {
            self.lower_rule(rule, ctx, depth)?;
        }
        Ok(())
    }

    fn lower_rule(
        &mut self,
        rule: &Rule,
        ctx: StateId,
        depth: u32,
    ) -> Result<(), NormalizeError> {
        match rule {
            Rule::Match(m) => self.lower_match(m, ctx, depth),
            Rule::Span(span) => self.lower_span(span, ctx, depth),
            Rule::Container(c) => self.lower_list(&c.patterns, ctx, depth),
            Rule::Include(target) => self.lower_include(target, ctx, depth),
            Rule::Unsupported { feature } => {
                // Strict mode already failed in validation.
                self.diagnostics
                    .warn(format!("skipping unsupported `{feature}` rule"));
                Ok(())
            }
        }
    }

    fn lower_include(
        &mut self,
        target: &IncludeTarget,
        ctx: StateId,
        depth: u32,
    ) -> Result<(), NormalizeError> {
        match target {
            IncludeTarget::Base => Ok(()), // empty in v1
            IncludeTarget::External(reference) => {
                self.diagnostics
                    .warn(format!("skipping cross-grammar include `{reference}`"));
                Ok(())
            }
            IncludeTarget::SelfRef => {
                if !self.enter(SELF_KEY)? {
                    return Ok(());
                }
                let patterns = &self.grammar.patterns;
                let result = self.lower_list(patterns, ctx, depth);
                self.exit(SELF_KEY);
                result
            }
            IncludeTarget::Repository(name) => {
                let Some(rule) = self.grammar.repository.get(name) else {
                    return Err(NormalizeError::UnknownRepositoryEntry(name.clone()));
                };
                if !self.enter(name)? {
                    return Ok(());
                }
                // Included rules keep the priority they would have inline:
                // inclusion and inlining must produce identical bytecode.
                let result = self.lower_rule(rule, ctx, depth);
                self.exit(name);
                result
            }
        }
    }

    /// Push an expansion onto the stack. `Ok(false)` means the reference
    /// re-enters a region the machine cannot unroll further: recursion that
    /// flows through `$self` is truncated at one level rather than rejected,
    /// since a flat machine has no way to express it. A cycle that never
    /// touches `$self` is a hard error naming the whole path.
    fn enter(&mut self, key: &str) -> Result<bool, NormalizeError> {
        if self.stack.insert(key.to_owned()) {
            return Ok(true);
        }
        if self.stack.contains(SELF_KEY) {
            self.diagnostics
                .note(format!("recursive include `{key}` truncated at one level"));
            return Ok(false);
        }
        let mut path: Vec<String> = self.stack.iter().cloned().collect();
        path.push(key.to_owned());
        Err(NormalizeError::IncludeCycle(path))
    }

    fn exit(&mut self, key: &str) {
        self.stack.shift_remove(key);
    }

    /// A match rule contributes one self-looping rule to its context state.
    fn lower_match(
        &mut self,
        rule: &MatchRule,
        ctx: StateId,
        depth: u32,
    ) -> Result<(), NormalizeError> {
        let priority = priority_of(rule.name.is_some(), !rule.captures.is_empty(), depth);

        let mut actions = Vec::new();
        if let Some(name) = &rule.name {
            let scope = self.machine.scopes.intern(name);
            actions.push(self.machine.alloc_action(Action::SetScope(scope)));
        }
        actions.push(self.machine.alloc_action(Action::EmitToken { group: 0 }));
        self.capture_actions(&rule.captures, &mut actions);

        let guard = predicates::build(&rule.pattern)?;
        let consume = guard.consumes_input();
        self.machine.push_transition(
            ctx,
            Transition {
                guard,
                target: ctx,
                priority,
                consume,
                stack: StackEffect::None,
                actions,
            },
        );
        Ok(())
    }

    /// A span rule allocates a body and an exit state. The begin transition
    /// pushes into the body, the end transition pops out to the exit; child
    /// patterns live in the body.
    fn lower_span(
        &mut self,
        span: &SpanRule,
        ctx: StateId,
        depth: u32,
    ) -> Result<(), NormalizeError> {
        let has_captures = !span.begin_captures.is_empty() || !span.end_captures.is_empty();
        let priority = priority_of(span.name.is_some(), has_captures, depth);

        let body = self.machine.alloc_state(false);
        // Only a region that closes back at nesting depth 0 terminates the
        // input; inner exits hand control back to their parent body.
        let exit = self.machine.alloc_state(depth == 0);

        let mut begin_actions = Vec::new();
        self.capture_actions(&span.begin_captures, &mut begin_actions);
        let mut pushed = 0u8;
        if let Some(name) = &span.name {
            let scope = self.machine.scopes.intern(name);
            begin_actions.push(self.machine.alloc_action(Action::PushScope {
                scope,
                capture: None,
            }));
            pushed += 1;
        }
        if let Some(content) = &span.content_name {
            let scope = self.machine.scopes.intern(content);
            begin_actions.push(self.machine.alloc_action(Action::PushScope {
                scope,
                capture: None,
            }));
            pushed += 1;
        }

        let begin_guard = predicates::build(&span.begin)?;
        let consume = begin_guard.consumes_input();
        self.machine.push_transition(
            ctx,
            Transition {
                guard: begin_guard,
                target: body,
                priority,
                consume,
                stack: StackEffect::Push,
                actions: begin_actions,
            },
        );

        self.lower_list(&span.patterns, body, depth + 1)?;

        let mut end_actions = Vec::new();
        self.capture_actions(&span.end_captures, &mut end_actions);
        if pushed > 0 {
            end_actions.push(
                self.machine
                    .alloc_action(Action::PopScope { count: pushed }),
            );
        }

        let end_guard = predicates::build(&span.end)?;
        let consume = end_guard.consumes_input();
        self.machine.push_transition(
            body,
            Transition {
                guard: end_guard,
                target: exit,
                priority,
                consume,
                stack: StackEffect::Pop,
                actions: end_actions,
            },
        );
        Ok(())
    }

    fn capture_actions(&mut self, captures: &Captures, out: &mut Vec<ActionId>) {
        for (&group, capture) in captures {
            let Ok(group) = u8::try_from(group) else {
                self.diagnostics
                    .warn(format!("dropping capture group {group}: exceeds 255"));
                continue;
            };
            let scope = self.machine.scopes.intern(&capture.name);
            out.push(
                self.machine
                    .alloc_action(Action::CaptureGroup { group, scope }),
            );
        }
    }
}

/// The priority formula: base 50, +10 for a name, +5 for captures, +1 per
/// nesting level. Source order breaks ties downstream. Repository
/// indirection adds nothing, so including a rule and writing it inline
/// compile identically.
fn priority_of(has_name: bool, has_captures: bool, depth: u32) -> u8 {
    let mut priority = BASE_PRIORITY;
    if has_name {
        priority = priority.saturating_add(10);
    }
    if has_captures {
        priority = priority.saturating_add(5);
    }
    priority.saturating_add(depth.min(u8::MAX as u32) as u8)
}

//! Scene compilation.
//!
//! Compilation validates a [`SceneDef`] once, up front, so that a running
//! tour never meets a configuration problem: carousel children are resolved
//! to step indices, rule patterns are compiled, and the outer traversal order
//! is fixed. A step referenced as a carousel child is owned by that carousel
//! and is skipped by the outer sequence.

use std::collections::HashMap;

use regex::Regex;
use scenetour_core::error::ConfigError;
use tracing::debug;

use crate::domain::scene::{SceneDef, Theme};
use crate::domain::step::StepDef;

/// An input rule with its pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pattern: Option<Regex>,
    message: Option<String>,
}

impl CompiledRule {
    /// Returns `true` if `value` satisfies the rule. A rule without a pattern
    /// is vacuously satisfied.
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        self.pattern.as_ref().is_none_or(|re| re.is_match(value))
    }

    /// The message shown when the rule fails.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// A validated scene, ready to drive a tour.
#[derive(Debug, Clone)]
pub struct CompiledScene {
    def: SceneDef,
    /// Indices of the steps forming the outer sequence.
    top_level: Vec<usize>,
    /// Resolved carousel children, per step.
    children: Vec<Vec<usize>>,
    rules: Vec<Vec<CompiledRule>>,
}

impl CompiledScene {
    /// Validates `def` and resolves everything a running tour needs.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, checking in this order: empty
    /// scene, duplicate ids, missing selectors, invalid rule patterns,
    /// unresolved carousel children, then carousel cycles.
    pub fn compile(def: SceneDef) -> Result<Self, ConfigError> {
        if def.steps.is_empty() {
            return Err(ConfigError::EmptyScene);
        }

        let mut ids: HashMap<&str, usize> = HashMap::new();
        for (index, step) in def.steps.iter().enumerate() {
            if let Some(id) = step.id() {
                if ids.insert(id, index).is_some() {
                    return Err(ConfigError::DuplicateStepId(id.to_owned()));
                }
            }
        }

        let mut rules = Vec::with_capacity(def.steps.len());
        for (index, step) in def.steps.iter().enumerate() {
            if step.selector().is_some_and(|selector| selector.is_empty()) {
                return Err(ConfigError::MissingSelector(index));
            }
            rules.push(compile_rules(index, step)?);
        }

        let mut children = Vec::with_capacity(def.steps.len());
        let mut owned = vec![false; def.steps.len()];
        for (index, step) in def.steps.iter().enumerate() {
            let resolved = match step {
                StepDef::Carousel(carousel) => carousel
                    .children
                    .iter()
                    .map(|child| {
                        ids.get(child.as_str())
                            .copied()
                            .ok_or_else(|| ConfigError::UnresolvedChild {
                                carousel: index,
                                child: child.clone(),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                _ => Vec::new(),
            };
            for &child in &resolved {
                owned[child] = true;
            }
            children.push(resolved);
        }

        if let Some(index) = find_cycle(&children) {
            let label = def.steps[index]
                .id()
                .map_or_else(|| format!("#{index}"), str::to_owned);
            return Err(ConfigError::CarouselCycle(label));
        }

        // Acyclic ownership guarantees at least one unowned step.
        let top_level: Vec<usize> = (0..def.steps.len()).filter(|&i| !owned[i]).collect();

        debug!(
            steps = def.steps.len(),
            outer = top_level.len(),
            "compiled scene"
        );

        Ok(Self {
            def,
            top_level,
            children,
            rules,
        })
    }

    /// The scene as it was defined.
    #[must_use]
    pub fn def(&self) -> &SceneDef {
        &self.def
    }

    #[must_use]
    pub fn theme(&self) -> Option<&Theme> {
        self.def.theme.as_ref()
    }

    /// Returns the step at `index` in the scene's declaration order.
    #[must_use]
    pub fn step(&self, index: usize) -> Option<&StepDef> {
        self.def.steps.get(index)
    }

    /// Indices of the steps forming the outer sequence, in order.
    #[must_use]
    pub fn top_level(&self) -> &[usize] {
        &self.top_level
    }

    /// Resolved children of the carousel at `index`; empty for other steps.
    #[must_use]
    pub fn children(&self, index: usize) -> &[usize] {
        self.children.get(index).map_or(&[], Vec::as_slice)
    }

    /// Compiled rules of the input checker at `index`; empty for other steps.
    #[must_use]
    pub fn rules(&self, index: usize) -> &[CompiledRule] {
        self.rules.get(index).map_or(&[], Vec::as_slice)
    }
}

fn compile_rules(index: usize, step: &StepDef) -> Result<Vec<CompiledRule>, ConfigError> {
    let StepDef::InputChecker(checker) = step else {
        return Ok(Vec::new());
    };
    checker
        .rules
        .iter()
        .map(|rule| {
            let pattern = rule
                .pattern
                .as_deref()
                .map(|source| {
                    Regex::new(source).map_err(|e| ConfigError::InvalidPattern {
                        step: index,
                        pattern: source.to_owned(),
                        reason: e.to_string(),
                    })
                })
                .transpose()?;
            Ok(CompiledRule {
                pattern,
                message: rule.message.clone(),
            })
        })
        .collect()
}

/// Returns a step that lies on a cycle of the carousel graph, if any.
fn find_cycle(children: &[Vec<usize>]) -> Option<usize> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; children.len()];
    for root in 0..children.len() {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        // Iterative depth-first walk: (node, next child offset).
        let mut stack = vec![(root, 0usize)];
        marks[root] = Mark::InProgress;
        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            if let Some(&child) = children[node].get(frame.1) {
                frame.1 += 1;
                match marks[child] {
                    Mark::InProgress => return Some(child),
                    Mark::Unvisited => {
                        marks[child] = Mark::InProgress;
                        stack.push((child, 0));
                    }
                    Mark::Done => {}
                }
            } else {
                marks[node] = Mark::Done;
                stack.pop();
            }
        }
    }
    None
}

//! Dependency graph for step execution ordering.
//!
//! Nodes are step names from a single list; an edge `a -> b` exists when
//! `b` lists `a` in its `depends_on`. Nodes keep their declaration order,
//! which the scheduler uses to break ties between independent steps.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::error::{RigupError, Result};
use crate::steps::Step;

/// Represents the dependency relationships between steps.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Step names in declaration order.
    steps: Vec<String>,
    /// Step name to declaration index.
    index: HashMap<String, usize>,
    /// For each step, the indices of its direct dependencies.
    dependencies: Vec<Vec<usize>>,
    /// For each step, the indices of the steps that depend on it.
    dependents: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Create a new dependency graph builder.
    pub fn builder() -> DependencyGraphBuilder {
        DependencyGraphBuilder::new()
    }

    /// Build a graph over a list of validated steps.
    pub fn from_steps(steps: &[Step]) -> Result<Self> {
        steps
            .iter()
            .fold(Self::builder(), |builder, step| {
                builder.add_step(step.name.clone(), step.depends_on.clone())
            })
            .build()
    }

    /// Get the direct dependencies of a step, in the order they were declared.
    pub fn dependencies_of(&self, step: &str) -> Option<Vec<&str>> {
        let idx = *self.index.get(step)?;
        Some(
            self.dependencies[idx]
                .iter()
                .map(|&d| self.steps[d].as_str())
                .collect(),
        )
    }

    /// Get steps that depend on the given step, in declaration order.
    pub fn dependents_of(&self, step: &str) -> Option<Vec<&str>> {
        let idx = *self.index.get(step)?;
        let mut dependents = self.dependents[idx].clone();
        dependents.sort_unstable();
        Some(dependents.iter().map(|&d| self.steps[d].as_str()).collect())
    }

    /// Check if a step exists in the graph.
    pub fn contains(&self, step: &str) -> bool {
        self.index.contains_key(step)
    }

    /// Get all step names in declaration order.
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Get the number of steps in the graph.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns steps in topological order (dependencies before dependents).
    ///
    /// Among steps whose dependencies are all satisfied, the one declared
    /// first is always taken next, so the order is fully determined by the
    /// input.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        let mut in_degree: Vec<usize> = self.dependencies.iter().map(Vec::len).collect();

        // Min-heap on declaration index
        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree == 0)
            .map(|(idx, _)| Reverse(idx))
            .collect();

        let mut result = Vec::with_capacity(self.steps.len());

        while let Some(Reverse(idx)) = ready.pop() {
            result.push(self.steps[idx].clone());

            for &dependent in &self.dependents[idx] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        // Unreachable for graphs from `build`, which rejects cycles.
        if result.len() != self.steps.len() {
            let cycle = self
                .find_cycle()
                .map(|c| c.join(" -> "))
                .unwrap_or_else(|| "unresolvable ordering".to_string());
            return Err(RigupError::CircularDependency { cycle });
        }

        Ok(result)
    }

    /// Find a cycle in the graph, returning the path if one exists.
    ///
    /// The path starts and ends with the same step, e.g. `["a", "b", "a"]`.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Unvisited,
            Visiting,
            Visited,
        }

        fn dfs(
            node: usize,
            graph: &DependencyGraph,
            state: &mut [State],
            path: &mut Vec<usize>,
        ) -> Option<Vec<String>> {
            state[node] = State::Visiting;
            path.push(node);

            for &dep in &graph.dependencies[node] {
                match state[dep] {
                    State::Visiting => {
                        let start = path.iter().position(|&n| n == dep).unwrap_or(0);
                        let mut cycle: Vec<String> = path[start..]
                            .iter()
                            .map(|&n| graph.steps[n].clone())
                            .collect();
                        cycle.push(graph.steps[dep].clone());
                        return Some(cycle);
                    }
                    State::Unvisited => {
                        if let Some(cycle) = dfs(dep, graph, state, path) {
                            return Some(cycle);
                        }
                    }
                    State::Visited => {}
                }
            }

            path.pop();
            state[node] = State::Visited;
            None
        }

        let mut state = vec![State::Unvisited; self.steps.len()];
        let mut path = Vec::new();

        for node in 0..self.steps.len() {
            if state[node] == State::Unvisited {
                if let Some(cycle) = dfs(node, self, &mut state, &mut path) {
                    return Some(cycle);
                }
            }
        }

        None
    }
}

/// Builder for constructing a DependencyGraph.
#[derive(Debug, Default)]
pub struct DependencyGraphBuilder {
    steps: Vec<(String, Vec<String>)>,
}

impl DependencyGraphBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step with its dependencies.
    pub fn add_step(mut self, name: impl Into<String>, depends_on: Vec<String>) -> Self {
        self.steps.push((name.into(), depends_on));
        self
    }

    /// Build the dependency graph.
    ///
    /// Fails on duplicate step names, on dependencies that reference a
    /// step not in the graph, and on cycles.
    pub fn build(self) -> Result<DependencyGraph> {
        let mut index = HashMap::with_capacity(self.steps.len());
        for (idx, (name, _)) in self.steps.iter().enumerate() {
            if index.insert(name.clone(), idx).is_some() {
                return Err(RigupError::DuplicateStep { name: name.clone() });
            }
        }

        let mut dependencies = vec![Vec::new(); self.steps.len()];
        let mut dependents = vec![Vec::new(); self.steps.len()];

        for (idx, (name, deps)) in self.steps.iter().enumerate() {
            for dep in deps {
                let dep_idx = *index.get(dep).ok_or_else(|| RigupError::MissingDependency {
                    step: name.clone(),
                    dependency: dep.clone(),
                })?;
                if dependencies[idx].contains(&dep_idx) {
                    continue;
                }
                dependencies[idx].push(dep_idx);
                dependents[dep_idx].push(idx);
            }
        }

        let graph = DependencyGraph {
            steps: self.steps.into_iter().map(|(name, _)| name).collect(),
            index,
            dependencies,
            dependents,
        };

        if let Some(cycle) = graph.find_cycle() {
            return Err(RigupError::CircularDependency {
                cycle: cycle.join(" -> "),
            });
        }

        Ok(graph)
    }
}

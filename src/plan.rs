//! Task plans: tasks composed in series and in parallel.
//!
//! A series runs its children one after another and stops at the first
//! failure. A parallel group starts every child on the rayon pool and lets
//! all of them finish, even when one of them fails; the group then reports
//! the first failure in declaration order.

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use petgraph::graph::{Graph, NodeIndex};
use rayon::prelude::*;
use tracing::{Level, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::error::PlanError;
use crate::utils::{PLAN_STYLE, TASK_STYLE, as_overhead};

#[derive(Debug, Clone)]
pub struct TaskExecution {
    pub start: Instant,
    pub duration: Duration,
}

/// Timings of every task that ran, keyed by task name.
#[derive(Debug, Default)]
pub struct Diagnostics {
    pub execution_times: HashMap<String, TaskExecution>,
}

impl Diagnostics {
    /// Task names with their durations, in the order they started.
    pub fn timeline(&self) -> Vec<(&str, Duration)> {
        let mut acc: Vec<_> = self.execution_times.iter().collect();
        acc.sort_by_key(|(_, exec)| exec.start);
        acc.into_iter()
            .map(|(name, exec)| (name.as_str(), exec.duration))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan<T> {
    Task(T),
    Series(Vec<Plan<T>>),
    Parallel(Vec<Plan<T>>),
}

impl<T> Plan<T>
where
    T: Copy + Display + Send + Sync,
{
    pub fn series(children: impl IntoIterator<Item = Plan<T>>) -> Self {
        Plan::Series(children.into_iter().collect())
    }

    pub fn parallel(children: impl IntoIterator<Item = Plan<T>>) -> Self {
        Plan::Parallel(children.into_iter().collect())
    }

    /// Leaf tasks in declaration order.
    pub fn tasks(&self) -> Vec<T> {
        let mut acc = Vec::new();
        self.collect_tasks(&mut acc);
        acc
    }

    fn collect_tasks(&self, acc: &mut Vec<T>) {
        match self {
            Plan::Task(task) => acc.push(*task),
            Plan::Series(children) | Plan::Parallel(children) => {
                for child in children {
                    child.collect_tasks(acc);
                }
            }
        }
    }

    /// Runs the plan, calling `action` for every leaf task.
    pub fn run<F>(&self, action: F) -> Result<Diagnostics, PlanError>
    where
        F: Fn(T) -> anyhow::Result<()> + Sync,
    {
        let total = self.tasks().len() as u64;

        let root_span = tracing::span!(Level::INFO, "plan");
        root_span.pb_set_length(total);
        root_span.pb_set_style(&PLAN_STYLE);
        root_span.pb_set_message("Running tasks...");
        let _enter = root_span.enter();

        let start = Instant::now();
        let times = Mutex::new(HashMap::new());
        self.execute(&action, &times, &root_span)?;

        tracing::info!("Build complete! {}", as_overhead(start));

        Ok(Diagnostics {
            execution_times: times.into_inner().unwrap_or_else(PoisonError::into_inner),
        })
    }

    fn execute<F>(
        &self,
        action: &F,
        times: &Mutex<HashMap<String, TaskExecution>>,
        root: &Span,
    ) -> Result<(), PlanError>
    where
        F: Fn(T) -> anyhow::Result<()> + Sync,
    {
        match self {
            Plan::Task(task) => {
                let result = run_task(*task, action, times);
                root.pb_inc(1);
                result
            }
            Plan::Series(children) => {
                for child in children {
                    child.execute(action, times, root)?;
                }
                Ok(())
            }
            Plan::Parallel(children) => {
                let results: Vec<_> = children
                    .par_iter()
                    .map(|child| {
                        // workers do not inherit the caller's span
                        let _enter = root.enter();
                        child.execute(action, times, root)
                    })
                    .collect();

                results.into_iter().find(Result::is_err).unwrap_or(Ok(()))
            }
        }
    }
}

fn run_task<T, F>(
    task: T,
    action: &F,
    times: &Mutex<HashMap<String, TaskExecution>>,
) -> Result<(), PlanError>
where
    T: Display,
    F: Fn(T) -> anyhow::Result<()>,
{
    let name = task.to_string();

    let span = tracing::span!(Level::INFO, "task", name = %name);
    span.pb_set_style(&TASK_STYLE);
    span.pb_set_message(&format!("Running {name}"));
    let _enter = span.enter();

    tracing::debug!("Starting '{name}'");
    let start = Instant::now();

    let result = match catch_unwind(AssertUnwindSafe(|| action(task))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => Err(PlanError::Task(name.clone(), error)),
        Err(panic) => {
            let msg = if let Some(s) = panic.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                String::from("unknown payload")
            };
            Err(PlanError::Panic(name.clone(), msg))
        }
    };

    let duration = start.elapsed();
    times
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(name.clone(), TaskExecution { start, duration });

    match &result {
        Ok(()) => tracing::info!("Finished '{name}' {}", as_overhead(start)),
        Err(error) => tracing::error!("{error}"),
    }

    result
}

impl<T> Plan<T>
where
    T: Display,
{
    /// Dependency graph of the plan: an edge means "starts after".
    pub fn graph(&self) -> Graph<String, ()> {
        let mut graph = Graph::new();
        self.add_to(&mut graph);
        graph
    }

    /// Adds the plan's nodes, returning its entry and exit nodes.
    fn add_to(&self, graph: &mut Graph<String, ()>) -> (Vec<NodeIndex>, Vec<NodeIndex>) {
        match self {
            Plan::Task(task) => {
                let index = graph.add_node(task.to_string());
                (vec![index], vec![index])
            }
            Plan::Series(children) => {
                let mut entry: Option<Vec<NodeIndex>> = None;
                let mut exit: Vec<NodeIndex> = Vec::new();

                for child in children {
                    let (child_entry, child_exit) = child.add_to(graph);
                    for &from in &exit {
                        for &to in &child_entry {
                            graph.add_edge(from, to, ());
                        }
                    }
                    entry.get_or_insert(child_entry);
                    exit = child_exit;
                }

                (entry.unwrap_or_default(), exit)
            }
            Plan::Parallel(children) => {
                let mut entry = Vec::new();
                let mut exit = Vec::new();
                for child in children {
                    let (child_entry, child_exit) = child.add_to(graph);
                    entry.extend(child_entry);
                    exit.extend(child_exit);
                }
                (entry, exit)
            }
        }
    }
}

/// Renders the plan as a Mermaid flowchart.
impl<T> Display for Plan<T>
where
    T: Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let graph = self.graph();

        writeln!(f, "graph LR")?;

        for index in graph.node_indices() {
            let name = graph[index].replace('"', "\\\"");
            writeln!(f, "    {}[\"{}\"]", index.index(), name)?;
        }

        for edge in graph.raw_edges() {
            writeln!(f, "    {} --> {}", edge.source().index(), edge.target().index())?;
        }

        Ok(())
    }
}

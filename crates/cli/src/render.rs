//! Terminal rendering of pipeline snapshots.
//!
//! Snapshots arrive through a watch channel and may skip intermediate
//! states, so rendering works on the difference between two snapshots
//! rather than on individual events.

use colored::Colorize;
use sk_protocol::ipc::IncompleteTask;
use sk_protocol::role_models::RoleStatus;
use sk_protocol::stage_models::{Stage, StepStatus};
use sk_protocol::state_models::PipelineState;
use std::io::Write;

/// One piece of terminal output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Render {
    /// A status line.
    Line(String),
    /// Streamed agent output, printed as is.
    Text(String),
}

/// What changed between `prev` and `next`, in display order.
pub fn diff(prev: &PipelineState, next: &PipelineState) -> Vec<Render> {
    let mut out = Vec::new();

    if next.task_id != prev.task_id {
        if let Some(task_id) = &next.task_id {
            out.push(Render::Line(format!("{} task {task_id}", "●".cyan())));
        }
    }

    for stage in Stage::ALL {
        let (before, after) = (prev.step(stage), next.step(stage));

        if before.status == StepStatus::Idle && after.status != StepStatus::Idle {
            out.push(Render::Line(format!("{} {stage}", "▶".blue().bold())));
        }
        if after.output.len() > before.output.len() && after.output.starts_with(&before.output) {
            out.push(Render::Text(after.output[before.output.len()..].to_string()));
        }
        if after.status.is_terminal() && !before.status.is_terminal() {
            let line = match after.status {
                StepStatus::Error => format!("{} {stage} failed", "✖".red().bold()),
                _ => format!("{} {stage} completed", "✔".green().bold()),
            };
            out.push(Render::Line(line));
        }
    }

    for (index, role) in next.role_states.iter().enumerate() {
        let changed = prev
            .role_states
            .get(index)
            .map_or(true, |old| old.status != role.status);
        if !changed || role.status == RoleStatus::Pending {
            continue;
        }
        let status = match role.status {
            RoleStatus::Completed => format!("completed ({:.1})", role.final_score).green().to_string(),
            RoleStatus::Error => "error".red().to_string(),
            other => format!("{other:?}").to_lowercase(),
        };
        out.push(Render::Line(format!(
            "  [{}/{}] {} {status}",
            index + 1,
            next.total_roles,
            role.role_name
        )));
    }

    if next.is_paused && !prev.is_paused {
        out.push(Render::Line(format!("{} paused", "⏸".yellow())));
    } else if prev.is_paused && !next.is_paused && next.is_running {
        out.push(Render::Line(format!("{} resumed", "▶".yellow())));
    }

    if next.error != prev.error {
        if let Some(error) = &next.error {
            out.push(Render::Line(format!("{} {error}", "error:".red().bold())));
        }
    }

    out
}

/// Final report for a finished or imported state.
pub fn summary(state: &PipelineState) -> Vec<String> {
    let mut lines = Vec::new();
    let name = state
        .prompt_suite
        .as_ref()
        .map(|suite| suite.system_name.as_str())
        .or_else(|| state.system_architecture.as_ref().map(|a| a.system_name.as_str()))
        .filter(|name| !name.is_empty())
        .unwrap_or("(unnamed system)");
    lines.push(format!("{}", name.bold()));
    lines.push(format!(
        "roles: {}/{} completed ({:.0}%)",
        state.completed_roles(),
        state.total_roles,
        state.progress() * 100.0
    ));
    for role in &state.role_states {
        lines.push(format!(
            "  - {} [{:?}] {:.1}",
            role.role_name, role.role_type, role.final_score
        ));
    }
    if let Some(test) = &state.test_result {
        lines.push(format!(
            "tests: {}/{} passed, verdict {}",
            test.summary.passed, test.summary.total_tests, test.summary.verdict
        ));
    }
    lines
}

/// Table of tasks left incomplete.
pub fn incomplete_table(tasks: &[IncompleteTask]) -> Vec<String> {
    if tasks.is_empty() {
        return vec!["no incomplete tasks".to_string()];
    }
    tasks
        .iter()
        .map(|task| {
            format!(
                "{}  {:<10} {}/{} roles  {}  {}",
                task.task_id.as_str().bold(),
                task.status,
                task.completed_roles,
                task.total_roles,
                task.updated_at.as_deref().unwrap_or("-"),
                task.description
            )
        })
        .collect()
}

/// Writes [`Render`] items to stdout, keeping status lines on their own line.
#[derive(Debug)]
pub struct Printer {
    at_line_start: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self {
            at_line_start: true,
        }
    }
}

impl Printer {
    pub fn emit(&mut self, items: Vec<Render>) {
        let mut stdout = std::io::stdout().lock();
        for item in items {
            // Output is best effort; a closed stdout must not stop the run.
            let _ = match item {
                Render::Line(line) => {
                    let prefix = if self.at_line_start { "" } else { "\n" };
                    self.at_line_start = true;
                    writeln!(stdout, "{prefix}{line}")
                }
                Render::Text(text) => {
                    self.at_line_start = text.ends_with('\n');
                    write!(stdout, "{text}")
                }
            };
        }
        let _ = stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_protocol::role_models::{RoleProcessState, RoleType};
    use sk_protocol::state_models::TaskId;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_diff_stage_lifecycle_in_one_snapshot() {
        plain();
        let prev = PipelineState::new();
        let mut next = prev.clone();
        next.task_id = Some(TaskId::new("t1"));
        next.step_mut(Stage::Analyze).status = StepStatus::Completed;
        next.step_mut(Stage::Analyze).output = "Hello".to_string();

        assert_eq!(
            diff(&prev, &next),
            vec![
                Render::Line("● task t1".to_string()),
                Render::Line("▶ analyze".to_string()),
                Render::Text("Hello".to_string()),
                Render::Line("✔ analyze completed".to_string()),
            ]
        );
    }

    #[test]
    fn test_diff_output_delta_only() {
        plain();
        let mut prev = PipelineState::new();
        prev.step_mut(Stage::Review).status = StepStatus::Running;
        prev.step_mut(Stage::Review).output = "abc".to_string();
        let mut next = prev.clone();
        next.step_mut(Stage::Review).output = "abcdef".to_string();

        assert_eq!(diff(&prev, &next), vec![Render::Text("def".to_string())]);
        assert!(diff(&next, &next).is_empty());
    }

    #[test]
    fn test_diff_roles_pause_and_error() {
        plain();
        let mut prev = PipelineState::new();
        prev.is_running = true;
        prev.total_roles = 2;
        prev.role_states = vec![
            RoleProcessState::pending("a".into(), "Triage".into(), RoleType::Core),
            RoleProcessState::pending("b".into(), "QA".into(), RoleType::Quality),
        ];
        let mut next = prev.clone();
        next.role_states[1].status = RoleStatus::Completed;
        next.role_states[1].final_score = 8.0;
        next.is_paused = true;
        next.error = Some("quota exceeded".to_string());

        assert_eq!(
            diff(&prev, &next),
            vec![
                Render::Line("  [2/2] QA completed (8.0)".to_string()),
                Render::Line("⏸ paused".to_string()),
                Render::Line("error: quota exceeded".to_string()),
            ]
        );
    }

    #[test]
    fn test_summary_and_table() {
        plain();
        let mut state = PipelineState::new();
        state.total_roles = 1;
        state.role_states = vec![RoleProcessState {
            status: RoleStatus::Completed,
            final_score: 9.0,
            ..RoleProcessState::pending("a".into(), "Triage".into(), RoleType::Core)
        }];

        let lines = summary(&state);
        assert_eq!(lines[0], "(unnamed system)");
        assert_eq!(lines[1], "roles: 1/1 completed (100%)");
        assert_eq!(lines[2], "  - Triage [Core] 9.0");

        assert_eq!(incomplete_table(&[]), vec!["no incomplete tasks".to_string()]);
    }
}

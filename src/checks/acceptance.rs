//! User acceptance workflows
//!
//! Simulates a new user from sign-up through goal editing to sign-out, and a
//! visitor using the demo account.

use std::time::Duration;

use async_trait::async_trait;

use super::auth::demo_login;
use super::{fail, pass, report_err, section, unique_email, warn, Report, Suite};
use crate::backend::{Backend, Goal, RowId, Session, Task};
use crate::common::{unix_timestamp, Config, Error, Result};

pub const USER_WORKFLOW: &str = "Complete User Workflow";
pub const DEMO_WORKFLOW: &str = "Demo Account Workflow";

/// Tasks of the goal created by the workflow
pub fn workflow_tasks() -> Vec<Task> {
    vec![
        Task::new(1, "First task", "2025-11-04"),
        Task::new(2, "Second task", "2025-11-05"),
    ]
}

/// Mark the first task complete, leaving the rest untouched
pub fn complete_first_task(mut tasks: Vec<Task>) -> Result<Vec<Task>> {
    let first = tasks
        .first_mut()
        .ok_or_else(|| Error::TestAssertion("goal has no tasks to complete".to_string()))?;
    first.is_complete = true;
    Ok(tasks)
}

/// `acceptance`
pub struct AcceptanceSuite<'a> {
    backend: Backend,
    config: &'a Config,
}

impl<'a> AcceptanceSuite<'a> {
    pub fn new(config: &'a Config) -> Result<Self> {
        Ok(Self {
            backend: Backend::from_config(config)?,
            config,
        })
    }

    /// Sign-up → sign-in → create → read → update → re-read → sign-out
    pub async fn user_workflow(&self) -> Result<()> {
        let rest = &self.backend.rest;
        let auth = &self.backend.auth;

        println!("\n  Step 1: User creates new account");
        let signup = &self.config.signup;
        let email = unique_email(&signup.email_prefix, &signup.email_domain, unix_timestamp());
        report_err("Sign up", auth.sign_up(&email, &signup.password).await)?;
        pass(format!("Account created: {}", email));

        println!("\n  Step 2: User signs in immediately (no email confirmation)");
        tokio::time::sleep(Duration::from_millis(self.config.timeouts.sign_in_delay_ms)).await;
        let session = report_err(
            "Sign in",
            auth.sign_in_with_password(&email, &signup.password).await,
        )?;
        pass("Signed in successfully");
        pass("Session token received");

        println!("\n  Step 3: User creates a goal");
        let goal = Goal::new(&session.user_id, "My First Goal", "Testing the goals feature")
            .with_tasks(workflow_tasks());
        let created = report_err("Create goal", rest.create_goal(&session, &goal).await)?;
        let goal_id = created.and_then(|g| g.id).ok_or_else(|| {
            let err = Error::missing_field("create goal", "id");
            fail(&err);
            err
        })?;
        pass("Goal created successfully");
        pass(format!("Goal ID: {}", goal_id));

        println!("\n  Step 4: User views their goals");
        let goals = self.read_goals(&session).await?;
        pass(format!("Goals retrieved: {} goal(s)", goals.len()));
        let stored = find_goal(goals, &goal_id)?;
        pass("Created goal is in the listing");

        println!("\n  Step 5: User updates their goal");
        let tasks = report_err("Update goal", complete_first_task(stored.tasks))?;
        report_err(
            "Update goal",
            rest.update_goal_tasks(&session, &goal_id, &tasks).await,
        )?;
        pass("Goal updated (marked first task as complete)");

        println!("\n  Step 6: User sees the updated goal");
        let reread = find_goal(self.read_goals(&session).await?, &goal_id)?;
        if !reread.tasks.first().is_some_and(|t| t.is_complete) {
            let err = Error::TestAssertion("first task is not complete after update".to_string());
            fail(&err);
            return Err(err);
        }
        pass("Update is visible on re-read");

        println!("\n  Step 7: User signs out");
        let status = report_err("Sign out", auth.logout(&session).await)?;
        pass(format!("Signed out successfully (HTTP {})", status));

        Ok(())
    }

    /// Demo login, then load whatever goals the demo account has
    pub async fn demo_workflow(&self) -> Result<()> {
        println!("\n  Demo user clicks 'Try Demo Account'");
        let session = report_err("Demo login", demo_login(&self.backend, self.config).await)?;

        match self.backend.rest.list_goals(&session, &session.user_id).await {
            Ok(goals) => pass(format!("Demo data loaded: {} goal(s) available", goals.len())),
            Err(e) => warn(format!("Could not load demo goals: {}", e)),
        }
        Ok(())
    }

    async fn read_goals(&self, session: &Session) -> Result<Vec<Goal>> {
        report_err(
            "Get goals",
            self.backend.rest.list_goals(session, &session.user_id).await,
        )
    }
}

fn find_goal(goals: Vec<Goal>, id: &RowId) -> Result<Goal> {
    goals
        .into_iter()
        .find(|g| g.id.as_ref() == Some(id))
        .ok_or_else(|| {
            let err = Error::TestAssertion(format!("goal {} not found in listing", id));
            fail(&err);
            err
        })
}

#[async_trait]
impl Suite for AcceptanceSuite<'_> {
    fn title(&self) -> String {
        "Goals Tracker App - User Acceptance Testing".to_string()
    }

    async fn run(&self, report: &mut Report) -> Result<()> {
        section("USER ACCEPTANCE TEST: Complete New User Workflow");
        let workflow = self.user_workflow().await;
        if workflow.is_ok() {
            pass("USER WORKFLOW TEST PASSED - All steps completed successfully");
        }
        report.record_result(USER_WORKFLOW, &workflow);

        section("DEMO ACCOUNT TEST: Quick Access Workflow");
        let demo = self.demo_workflow().await;
        if demo.is_ok() {
            pass("DEMO ACCOUNT TEST PASSED");
        }
        report.record_result(DEMO_WORKFLOW, &demo);

        Ok(())
    }

    fn footer(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(url) = &self.config.deployment.url {
            lines.push(format!("Production URL: {}", url));
        }
        if let Some(email) = &self.config.demo.email {
            lines.push(format!("Demo account: {}", email));
        }
        lines
    }
}

use super::*;
use std::collections::HashMap;

fn job_with_steps(whens: &[WhenPolicy]) -> Job {
    Job {
        id: JobId::new("job-1"),
        token: "tok".into(),
        steps: whens
            .iter()
            .enumerate()
            .map(|(i, w)| Step {
                name: format!("step-{i}"),
                script: vec!["echo hi".into()],
                timeout: Duration::from_secs(60),
                when: *w,
                allow_failure: false,
            })
            .collect(),
        variables: HashMap::new(),
        masked_variables: vec![],
        git: GitInfo {
            sha: "abc".into(),
            before_sha: "000".into(),
            r#ref: "main".into(),
            repo_url: "https://example.invalid/repo.git".into(),
        },
        artifacts: vec![],
        caches: vec![],
        services: vec![],
    }
}

#[test]
fn on_success_steps_run_when_build_has_not_failed() {
    let job = job_with_steps(&[WhenPolicy::OnSuccess, WhenPolicy::OnFailure]);
    let names: Vec<_> = job.steps_for_outcome(false).map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["step-0"]);
}

#[test]
fn on_failure_steps_run_only_when_build_failed() {
    let job = job_with_steps(&[WhenPolicy::OnSuccess, WhenPolicy::OnFailure]);
    let names: Vec<_> = job.steps_for_outcome(true).map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["step-1"]);
}

#[test]
fn always_steps_run_regardless_of_outcome() {
    let job = job_with_steps(&[WhenPolicy::Always]);
    assert_eq!(job.steps_for_outcome(false).count(), 1);
    assert_eq!(job.steps_for_outcome(true).count(), 1);
}

#[test]
fn manual_steps_never_auto_selected() {
    let job = job_with_steps(&[WhenPolicy::Manual]);
    assert_eq!(job.steps_for_outcome(false).count(), 0);
    assert_eq!(job.steps_for_outcome(true).count(), 0);
}

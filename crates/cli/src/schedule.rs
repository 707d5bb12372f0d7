// ABOUTME: Cooperative job scheduler: daily-status and case-details at configured wall-clock times.
// ABOUTME: Polls once a second and runs due jobs to completion, one at a time, in registration order.

use std::future::Future;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    DailyStatus,
    CaseDetails,
}

impl JobKind {
    /// Registration order.
    pub const ALL: [JobKind; 2] = [JobKind::DailyStatus, JobKind::CaseDetails];

    pub fn name(self) -> &'static str {
        match self {
            JobKind::DailyStatus => "daily-status",
            JobKind::CaseDetails => "case-details",
        }
    }
}

#[derive(Debug, Clone)]
struct Job {
    kind: JobKind,
    next_run: NaiveDateTime,
}

/// Job table. Every job fires at each of the trigger times.
#[derive(Debug, Clone)]
pub struct Scheduler {
    times: Vec<NaiveTime>,
    jobs: Vec<Job>,
}

impl Scheduler {
    /// Registers every job with its first firing strictly after `now`.
    /// `times` must be non-empty.
    pub fn new(times: &[NaiveTime], now: NaiveDateTime) -> Self {
        let mut times = times.to_vec();
        times.sort();
        times.dedup();
        let jobs = JobKind::ALL
            .iter()
            .map(|&kind| Job {
                kind,
                next_run: next_trigger(&times, now),
            })
            .collect();
        Self { times, jobs }
    }

    /// Jobs whose firing time has passed, in registration order.
    pub fn due_jobs(&self, now: NaiveDateTime) -> Vec<JobKind> {
        self.jobs
            .iter()
            .filter(|job| job.next_run <= now)
            .map(|job| job.kind)
            .collect()
    }

    /// Advances `kind` past the firing it just ran for. When the run finished at `now` after
    /// one or more later firings had passed, those firings collapse into a single run due
    /// at once, dated at the latest of them.
    pub fn mark_run(&mut self, kind: JobKind, now: NaiveDateTime) {
        let times = &self.times;
        if let Some(job) = self.jobs.iter_mut().find(|job| job.kind == kind) {
            let next = next_trigger(times, job.next_run);
            job.next_run = if next <= now {
                latest_trigger(times, now)
            } else {
                next
            };
        }
    }

    pub fn next_run(&self, kind: JobKind) -> Option<NaiveDateTime> {
        self.jobs
            .iter()
            .find(|job| job.kind == kind)
            .map(|job| job.next_run)
    }
}

/// First trigger time strictly after `after`, today or on a following day.
fn next_trigger(times: &[NaiveTime], after: NaiveDateTime) -> NaiveDateTime {
    let date = after.date();
    if let Some(time) = times.iter().find(|&&t| t > after.time()) {
        return date.and_time(*time);
    }
    let first = times.first().copied().unwrap_or(NaiveTime::MIN);
    date.succ_opt().unwrap_or(date).and_time(first)
}

/// Last trigger time at or before `at`, today or on the previous day.
fn latest_trigger(times: &[NaiveTime], at: NaiveDateTime) -> NaiveDateTime {
    let date = at.date();
    if let Some(time) = times.iter().rev().find(|&&t| t <= at.time()) {
        return date.and_time(*time);
    }
    let last = times.last().copied().unwrap_or(NaiveTime::MIN);
    date.pred_opt().unwrap_or(date).and_time(last)
}

/// Runs the job table forever on the current task.
pub async fn run_forever<F, Fut>(mut scheduler: Scheduler, mut run: F)
where
    F: FnMut(JobKind) -> Fut,
    Fut: Future<Output = ()>,
{
    for kind in JobKind::ALL {
        if let Some(next) = scheduler.next_run(kind) {
            tracing::info!(job = kind.name(), next_run = %next, "job scheduled");
        }
    }

    loop {
        let now = Local::now().naive_local();
        for kind in scheduler.due_jobs(now) {
            run(kind).await;
            scheduler.mark_run(kind, Local::now().naive_local());
            if let Some(next) = scheduler.next_run(kind) {
                tracing::debug!(job = kind.name(), next_run = %next, "job rescheduled");
            }
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn times() -> Vec<NaiveTime> {
        vec![
            NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
        ]
    }

    #[test]
    fn test_first_firing() {
        let s = Scheduler::new(&times(), at(1, 9, 0));
        assert_eq!(s.next_run(JobKind::CaseDetails), Some(at(1, 10, 30)));

        let s = Scheduler::new(&times(), at(1, 10, 30));
        assert_eq!(s.next_run(JobKind::DailyStatus), Some(at(1, 17, 30)));

        let s = Scheduler::new(&times(), at(1, 18, 0));
        assert_eq!(s.next_run(JobKind::DailyStatus), Some(at(2, 10, 30)));
    }

    #[test]
    fn test_due_jobs_in_registration_order() {
        let s = Scheduler::new(&times(), at(1, 9, 0));
        assert!(s.due_jobs(at(1, 10, 29)).is_empty());
        assert_eq!(
            s.due_jobs(at(1, 10, 30)),
            vec![JobKind::DailyStatus, JobKind::CaseDetails]
        );
    }

    #[test]
    fn test_late_run_delays_but_does_not_drop() {
        let mut s = Scheduler::new(&times(), at(1, 9, 0));
        s.mark_run(JobKind::DailyStatus, at(1, 10, 31));
        assert_eq!(s.next_run(JobKind::DailyStatus), Some(at(1, 17, 30)));

        // Case details for 10:30 only finished at 18:00; the 17:30 firing is still due.
        s.mark_run(JobKind::CaseDetails, at(1, 18, 0));
        assert_eq!(s.next_run(JobKind::CaseDetails), Some(at(1, 17, 30)));
        assert_eq!(s.due_jobs(at(1, 18, 0)), vec![JobKind::DailyStatus, JobKind::CaseDetails]);

        s.mark_run(JobKind::CaseDetails, at(1, 18, 5));
        assert_eq!(s.next_run(JobKind::CaseDetails), Some(at(2, 10, 30)));
        assert_eq!(s.due_jobs(at(1, 18, 5)), vec![JobKind::DailyStatus]);
    }

    #[test]
    fn test_long_stall_runs_once() {
        let mut s = Scheduler::new(&times(), at(1, 9, 0));

        // The 10:30 run on the 1st only returned on the 4th at 12:00.
        s.mark_run(JobKind::CaseDetails, at(4, 12, 0));
        assert_eq!(s.next_run(JobKind::CaseDetails), Some(at(4, 10, 30)));
        assert_eq!(s.due_jobs(at(4, 12, 0)), vec![JobKind::DailyStatus, JobKind::CaseDetails]);

        s.mark_run(JobKind::CaseDetails, at(4, 12, 1));
        assert_eq!(s.next_run(JobKind::CaseDetails), Some(at(4, 17, 30)));

        // Stalled before the first trigger of the day: the previous evening's firing stands in.
        s.mark_run(JobKind::DailyStatus, at(6, 9, 0));
        assert_eq!(s.next_run(JobKind::DailyStatus), Some(at(5, 17, 30)));
        s.mark_run(JobKind::DailyStatus, at(6, 9, 1));
        assert_eq!(s.next_run(JobKind::DailyStatus), Some(at(6, 10, 30)));
    }

    #[test]
    fn test_job_names() {
        let names: Vec<&str> = JobKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, vec!["daily-status", "case-details"]);
    }
}

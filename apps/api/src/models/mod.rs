pub mod catalog;
pub mod job;
pub mod job_skill;

pub mod test_agent;
pub mod test_learner;

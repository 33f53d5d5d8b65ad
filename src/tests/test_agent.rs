use ndarray::{array, Array1};
use std::sync::Arc;

use crate::agent::{Agent, AgentPhase};
use crate::approximator::Parameterized;
use crate::builders::DdpgBuilder;
use crate::error::DdpgError;
use crate::MlpContext;

fn context(batch_size: usize) -> Arc<MlpContext> {
    DdpgBuilder::new(3, 2)
        .hidden_sizes(vec![8])
        .buffer_size(1000)
        .batch_size(batch_size)
        .learn_every(2)
        .seed(3)
        .build()
        .unwrap()
}

fn state(t: usize) -> Array1<f32> {
    let x = t as f32 * 0.01;
    array![x.sin(), x.cos(), 0.5 - x.fract()]
}

#[test]
fn test_act_without_noise_is_bounded_and_deterministic() {
    let mut agent = Agent::new(context(4), 1);
    let s = array![10.0, -10.0, 3.0];

    let first = agent.act(s.view(), false).unwrap();
    let second = agent.act(s.view(), false).unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
    assert!(first.iter().all(|a| (-1.0..=1.0).contains(a)));
}

#[test]
fn test_act_with_large_noise_is_clipped() {
    let context = DdpgBuilder::new(3, 2)
        .hidden_sizes(vec![8])
        .buffer_size(100)
        .batch_size(4)
        .noise_params(5.0, 1.0, 10.0)
        .build()
        .unwrap();
    let mut agent = Agent::new(context, 7);
    agent.reset();

    for t in 0..20 {
        let action = agent.act(state(t).view(), true).unwrap();
        assert!(action.iter().all(|a| (-1.0..=1.0).contains(a)));
        // mu = 5 pushes every coordinate past the upper bound
        assert!(action.iter().all(|&a| a == 1.0));
    }
}

#[test]
fn test_phase_follows_act_and_step() {
    let mut agent = Agent::new(context(4), 1);
    assert_eq!(agent.phase(), AgentPhase::Idle);

    let s = state(0);
    let action = agent.act(s.view(), true).unwrap();
    assert_eq!(agent.phase(), AgentPhase::ActionEmitted);

    agent
        .step(1, s.view(), action.view(), 0.0, state(1).view(), false)
        .unwrap();
    assert_eq!(agent.phase(), AgentPhase::Idle);

    agent.act(s.view(), false).unwrap();
    agent.reset();
    assert_eq!(agent.phase(), AgentPhase::Idle);
}

#[test]
fn test_learning_waits_for_cadence_and_buffer() {
    let context = context(128);
    let mut agent = Agent::new(context.clone(), 1);
    let action = array![0.0, 0.0];

    // Never learn while the buffer holds batch_size transitions or fewer.
    for t in 0..128 {
        let report = agent
            .step(t, state(t).view(), action.view(), 1.0, state(t + 1).view(), false)
            .unwrap();
        assert!(report.is_none(), "learned at step {}", t);
    }
    assert_eq!(context.memory_len(), 128);
    assert_eq!(context.updates(), 0);

    for t in 128..136 {
        let report = agent
            .step(t, state(t).view(), action.view(), 1.0, state(t + 1).view(), false)
            .unwrap();
        assert_eq!(report.is_some(), t % 2 == 0, "step {}", t);
    }
    assert_eq!(context.updates(), 4);
}

#[test]
fn test_every_step_stores_a_transition() {
    let context = context(4);
    let mut agent = Agent::new(context.clone(), 1);
    let action = array![0.5, -0.5];

    for t in 0..10 {
        agent
            .step(t, state(t).view(), action.view(), -1.0, state(t + 1).view(), t == 9)
            .unwrap();
    }
    assert_eq!(context.memory_len(), 10);
}

#[test]
fn test_reset_only_touches_noise() {
    let context = context(4);
    let mut agent = Agent::new(context.clone(), 1);
    let action = array![0.1, 0.2];
    for t in 0..8 {
        agent
            .step(t, state(t).view(), action.view(), 0.5, state(t + 1).view(), false)
            .unwrap();
    }
    for _ in 0..5 {
        agent.act(state(0).view(), true).unwrap();
    }

    let params: Vec<Vec<f32>> = context
        .snapshot()
        .actor
        .parameters()
        .iter()
        .map(|p| p.iter().copied().collect())
        .collect();
    let stored = context.memory_len();
    let updates = context.updates();

    agent.reset();

    assert_eq!(agent.noise().state(), agent.noise().mu());
    assert_eq!(context.memory_len(), stored);
    assert_eq!(context.updates(), updates);
    let after: Vec<Vec<f32>> = context
        .snapshot()
        .actor
        .parameters()
        .iter()
        .map(|p| p.iter().copied().collect())
        .collect();
    assert_eq!(after, params);
}

#[test]
fn test_agents_share_memory_but_not_noise() {
    let context = context(4);
    let mut left = Agent::new(context.clone(), 1);
    let mut right = Agent::new(context.clone(), 2);
    let action = array![0.0, 0.0];

    left.step(1, state(0).view(), action.view(), 0.0, state(1).view(), false)
        .unwrap();
    right
        .step(1, state(5).view(), action.view(), 0.0, state(6).view(), false)
        .unwrap();
    assert_eq!(context.memory_len(), 2);

    left.reset();
    right.reset();
    let a = left.act(state(0).view(), true).unwrap();
    let b = right.act(state(0).view(), true).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_step_rejects_wrong_widths_before_storing() {
    let context = context(4);
    let mut agent = Agent::new(context.clone(), 1);
    let action = array![0.0, 0.0];

    let wide_action = array![0.0, 0.0, 0.0];
    let short_state = array![0.1, 0.2];
    let rejected = [
        agent.step(0, state(0).view(), wide_action.view(), 0.0, state(1).view(), false),
        agent.step(0, short_state.view(), action.view(), 0.0, state(1).view(), false),
        agent.step(0, state(0).view(), action.view(), 0.0, short_state.view(), false),
    ];
    for result in rejected.iter() {
        assert!(matches!(result, Err(DdpgError::DimensionMismatch { .. })));
    }
    assert_eq!(context.memory_len(), 0);
}

#[test]
fn test_rejected_step_does_not_break_other_agents() {
    let context = context(4);
    let mut sloppy = Agent::new(context.clone(), 1);
    let mut careful = Agent::new(context.clone(), 2);

    let wide_action = array![0.0, 0.0, 0.0];
    assert!(sloppy
        .step(0, state(0).view(), wide_action.view(), 0.0, state(1).view(), false)
        .is_err());

    let action = array![0.2, -0.2];
    for t in 0..40 {
        careful
            .step(t, state(t).view(), action.view(), 1.0, state(t + 1).view(), false)
            .unwrap();
    }
    assert_eq!(context.memory_len(), 40);
    assert!(context.updates() > 0);
}

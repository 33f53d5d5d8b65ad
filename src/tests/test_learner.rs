use ndarray::{array, Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::approximator::{Actor, Critic, MlpActor, MlpCritic, Parameterized};
use crate::error::DdpgError;
use crate::learner::{bootstrapped_targets, soft_update, Learner};
use crate::loss;
use crate::optimizer::{Adam, OptimizerWrapper};
use crate::replay_buffer::TransitionBatch;

fn learner(tau: f32) -> Learner<MlpActor, MlpCritic> {
    let mut rng = StdRng::seed_from_u64(21);
    let actor = MlpActor::new(3, 2, &[16], OptimizerWrapper::Adam(Adam::default()), 1e-3, &mut rng).unwrap();
    let critic = MlpCritic::new(3, 2, &[16], OptimizerWrapper::Adam(Adam::default()), 1e-2, &mut rng).unwrap();
    Learner::new(actor, critic, tau).unwrap()
}

fn batch(n: usize, seed: u64) -> TransitionBatch {
    let mut rng = StdRng::seed_from_u64(seed);
    let unit = Uniform::new(-1.0f32, 1.0);
    let dones = Array1::from_shape_fn(n, |i| if i % 4 == 3 { 1.0 } else { 0.0 });
    TransitionBatch {
        states: Array2::random_using((n, 3), unit, &mut rng),
        actions: Array2::random_using((n, 2), unit, &mut rng),
        rewards: Array1::random_using(n, unit, &mut rng),
        next_states: Array2::random_using((n, 3), unit, &mut rng),
        dones,
    }
}

fn flat<P: Parameterized>(model: &P) -> Vec<Vec<f32>> {
    model.parameters().iter().map(|p| p.iter().copied().collect()).collect()
}

#[test]
fn test_terminal_target_is_reward_only() {
    let rewards = array![1.5, -2.0];
    let next_values = array![100.0, -42.0];
    let dones = array![1.0, 1.0];

    for &gamma in [0.0, 0.5, 0.99, 1.0].iter() {
        let targets = bootstrapped_targets(rewards.view(), next_values.view(), dones.view(), gamma).unwrap();
        assert_eq!(targets, rewards);
    }
}

#[test]
fn test_non_terminal_target_bootstraps() {
    let targets = bootstrapped_targets(
        array![1.0, 1.0].view(),
        array![2.0, 4.0].view(),
        array![0.0, 1.0].view(),
        0.5,
    )
    .unwrap();
    assert_eq!(targets, array![2.0, 1.0]);
}

#[test]
fn test_targets_reject_length_mismatch() {
    let result = bootstrapped_targets(array![1.0].view(), array![1.0, 2.0].view(), array![0.0].view(), 0.9);
    assert!(matches!(result, Err(DdpgError::DimensionMismatch { .. })));
}

#[test]
fn test_target_lag_after_one_learn() {
    let tau = 0.25;
    let mut learner = learner(tau);
    // Move the currents away from the targets so the blend is not trivial.
    for seed in 0..3 {
        learner.learn(&batch(16, seed), 0.99).unwrap();
    }

    let before = learner.clone();
    learner.learn(&batch(16, 99), 0.99).unwrap();

    let pairs = [
        (flat(&learner.critic), flat(&before.critic_target), flat(&learner.critic_target)),
        (flat(&learner.actor), flat(&before.actor_target), flat(&learner.actor_target)),
    ];
    for (current, previous, blended) in pairs.iter() {
        assert_eq!(current.len(), blended.len());
        for ((c, p), b) in current.iter().zip(previous).zip(blended) {
            for ((&c, &p), &b) in c.iter().zip(p).zip(b) {
                assert_eq!(b, tau * c + (1.0 - tau) * p);
            }
        }
    }
}

#[test]
fn test_learn_runs_critic_then_actor_through_updated_critic() {
    let gamma = 0.9;
    let data = batch(12, 5);
    let mut learner = learner(0.01);
    let mut manual = learner.clone();

    learner.learn(&data, gamma).unwrap();

    let next_actions = manual.actor_target.evaluate(data.next_states.view()).unwrap();
    let next_values = manual
        .critic_target
        .evaluate(data.next_states.view(), next_actions.view())
        .unwrap();
    let targets = bootstrapped_targets(data.rewards.view(), next_values.view(), data.dones.view(), gamma).unwrap();
    let expected = manual.critic.evaluate(data.states.view(), data.actions.view()).unwrap();
    let (_, grads) = loss::mse(expected.view(), targets.view()).unwrap();
    manual
        .critic
        .gradient_step(data.states.view(), data.actions.view(), grads.view())
        .unwrap();

    let predicted = manual.actor.evaluate(data.states.view()).unwrap();
    let values = manual.critic.evaluate(data.states.view(), predicted.view()).unwrap();
    let (_, value_grads) = loss::negated_mean(values.view()).unwrap();
    let action_grads = manual
        .critic
        .action_gradient(data.states.view(), predicted.view(), value_grads.view())
        .unwrap();
    manual.actor.gradient_step(data.states.view(), action_grads.view()).unwrap();

    assert_eq!(flat(&learner.critic), flat(&manual.critic));
    assert_eq!(flat(&learner.actor), flat(&manual.actor));
}

#[test]
fn test_actor_update_does_not_touch_critic() {
    let mut learner = learner(0.01);
    let data = batch(8, 2);

    let predicted = learner.actor.evaluate(data.states.view()).unwrap();
    let critic_before = flat(&learner.critic);
    let values = learner.critic.evaluate(data.states.view(), predicted.view()).unwrap();
    let (_, value_grads) = loss::negated_mean(values.view()).unwrap();
    let action_grads = learner
        .critic
        .action_gradient(data.states.view(), predicted.view(), value_grads.view())
        .unwrap();
    learner.actor.gradient_step(data.states.view(), action_grads.view()).unwrap();

    assert_eq!(flat(&learner.critic), critic_before);
}

#[test]
fn test_actor_step_increases_critic_value() {
    let mut learner = learner(0.01);
    learner.actor.learning_rate = 1e-2;
    let data = batch(32, 8);

    let value = |l: &Learner<MlpActor, MlpCritic>| {
        let actions = l.actor.evaluate(data.states.view()).unwrap();
        l.critic.evaluate(data.states.view(), actions.view()).unwrap().mean().unwrap()
    };

    let initial = value(&learner);
    for _ in 0..20 {
        let predicted = learner.actor.evaluate(data.states.view()).unwrap();
        let values = learner.critic.evaluate(data.states.view(), predicted.view()).unwrap();
        let (_, value_grads) = loss::negated_mean(values.view()).unwrap();
        let action_grads = learner
            .critic
            .action_gradient(data.states.view(), predicted.view(), value_grads.view())
            .unwrap();
        learner.actor.gradient_step(data.states.view(), action_grads.view()).unwrap();
    }
    assert!(value(&learner) > initial);
}

#[test]
fn test_learn_reports_increasing_update_count() {
    let mut learner = learner(0.01);
    let first = learner.learn(&batch(8, 1), 0.99).unwrap();
    let second = learner.learn(&batch(8, 2), 0.99).unwrap();
    assert_eq!(first.update, 1);
    assert_eq!(second.update, 2);
    assert_eq!(learner.updates(), 2);
    assert!(first.critic_loss.is_finite() && first.actor_loss.is_finite());
}

#[test]
fn test_non_finite_reward_aborts_cycle() {
    let mut learner = learner(0.01);
    let mut data = batch(8, 3);
    data.rewards[0] = f32::NAN;

    let result = learner.learn(&data, 0.99);
    assert!(matches!(result, Err(DdpgError::Numerical(_))));
    assert_eq!(learner.updates(), 0);
}

#[test]
fn test_soft_update_full_copy_with_tau_one() {
    let learner = learner(0.5);
    let mut rng = StdRng::seed_from_u64(1234);
    let mut other = MlpActor::new(3, 2, &[16], OptimizerWrapper::Adam(Adam::default()), 1e-3, &mut rng).unwrap();

    soft_update(&learner.actor, &mut other, 1.0).unwrap();
    assert_eq!(flat(&other), flat(&learner.actor));
}

#[test]
fn test_soft_update_rejects_mismatched_models() {
    let learner = learner(0.5);
    let mut rng = StdRng::seed_from_u64(1);
    let mut wider = MlpActor::new(3, 2, &[32], OptimizerWrapper::Adam(Adam::default()), 1e-3, &mut rng).unwrap();
    let before = flat(&wider);

    let result = soft_update(&learner.actor, &mut wider, 0.5);
    assert!(matches!(result, Err(DdpgError::DimensionMismatch { .. })));
    assert_eq!(flat(&wider), before);
}

#[test]
fn test_learner_rejects_bad_tau() {
    let mut rng = StdRng::seed_from_u64(0);
    let actor = MlpActor::new(3, 2, &[4], OptimizerWrapper::Adam(Adam::default()), 1e-3, &mut rng).unwrap();
    let critic = MlpCritic::new(3, 2, &[4], OptimizerWrapper::Adam(Adam::default()), 1e-3, &mut rng).unwrap();
    assert!(Learner::new(actor, critic, 0.0).is_err());
}

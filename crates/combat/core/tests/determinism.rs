use std::sync::Arc;

use combat_core::{
    ActionDefinition, ActionId, ActorId, ActorSpec, Attribute, AuraDefinition, AuraId, Catalog,
    DamageProfile, Effect, Intent, PolicyView, RecastGroup, ResourceKind, SimConfig, SimTime,
    Simulator, StackingPolicy, Subject, Team, TraceDigest,
};

const TARGET: ActorId = ActorId(1);
const PLAYER: ActorId = ActorId(2);

const SHOT: ActionId = ActionId(1);
const BITE: ActionId = ActionId(2);
const BITE_DOT: AuraId = AuraId(1);

fn catalog() -> Arc<Catalog> {
    Arc::new(
        Catalog::new()
            .with_action(
                ActionDefinition::new(SHOT, "Burst Shot")
                    .recast_time(SimTime::from_millis(2_500))
                    .recast_group(RecastGroup::GLOBAL)
                    .effect(Effect::Damage(
                        DamageProfile::new(220).scaled_by(Attribute::Dexterity),
                    )),
            )
            .with_action(
                ActionDefinition::new(BITE, "Stormbite")
                    .recast_time(SimTime::from_millis(2_500))
                    .recast_group(RecastGroup::GLOBAL)
                    .effect(Effect::Damage(DamageProfile::new(100)))
                    .effect(Effect::ApplyAura {
                        aura: BITE_DOT,
                        subject: Subject::Targets,
                    }),
            )
            .with_aura(
                AuraDefinition::new(BITE_DOT, "Stormbite", SimTime::from_secs(45))
                    .debuff()
                    .stacking(StackingPolicy::Reset)
                    .periodic(SimTime::from_secs(3), DamageProfile::new(25)),
            ),
    )
}

fn keep_dot_up(view: &PolicyView<'_>) -> Option<Intent> {
    let dot_missing = view
        .target()
        .is_some_and(|target| target.auras().remains(BITE_DOT, view.now()) < SimTime::from_secs(3));
    let action = if dot_missing { BITE } else { SHOT };
    view.is_ready(action).then(|| Intent::new(action))
}

fn run(seed: u64) -> (TraceDigest, u64, usize) {
    let mut sim = Simulator::builder(catalog())
        .seed(seed)
        .config(SimConfig::new())
        .actor(
            ActorSpec::new(TARGET, "Striking Dummy")
                .team(Team::ENEMIES)
                .resource(ResourceKind::Health, 0),
        )
        .actor(
            ActorSpec::new(PLAYER, "Bard")
                .stat(Attribute::Dexterity, 300)
                .stat(Attribute::CriticalHit, 400)
                .stat(Attribute::DirectHit, 300)
                .actions([SHOT, BITE])
                .target(TARGET)
                .policy(keep_dot_up),
        )
        .build()
        .unwrap();

    sim.run(SimTime::from_secs(120));
    (
        sim.trace().digest(),
        sim.sink().damage_by(PLAYER),
        sim.sink().len(),
    )
}

#[test]
fn same_seed_same_trace() {
    let first = run(42);
    let second = run(42);
    assert_eq!(first, second);
    assert!(first.1 > 0);
}

#[test]
fn different_seed_different_trace() {
    assert_ne!(run(42).0, run(43).0);
}

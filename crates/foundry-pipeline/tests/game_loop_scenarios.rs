//! End-to-end scenarios combining `foundry-arena` and `foundry-pipeline`:
//! movement + damage, then cleanup of the dead.

use std::sync::{Arc, Mutex};

use foundry_arena::{Arena, AnyArena, EntityContainer, Handle};
use foundry_core::TickCount;
use foundry_pipeline::{
    CancellationToken, Executor, GroupMode, Registry, SerialSystem, SystemContext, SystemGroup,
    SystemNode, WorkerPool,
};

#[derive(Default)]
struct Unit {
    x: f32,
    vx: f32,
    hp: i32,
}

struct DamageOrder {
    target: Handle,
    amount: i32,
}

struct UnitRegistry {
    container: Mutex<EntityContainer>,
}

impl Registry for UnitRegistry {
    fn handles(&self) -> Vec<Handle> {
        self.container.lock().unwrap().iterate(0, 0)
    }
}

struct MovementSystem;

impl SerialSystem for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }
    fn process_serial(&mut self, _registry: &dyn Registry, handles: &[Handle], context: &SystemContext) {
        for handle in handles {
            if let Some(arena) = handle.try_as::<Unit>() {
                arena.try_get_mut(handle.index(), handle.generation(), |unit| {
                    unit.x += unit.vx * context.delta_ticks.0 as f32;
                });
            }
        }
    }
}

struct DamageSystem {
    queue: Vec<DamageOrder>,
}

impl SerialSystem for DamageSystem {
    fn name(&self) -> &str {
        "damage"
    }
    fn process_serial(&mut self, _registry: &dyn Registry, _handles: &[Handle], _context: &SystemContext) {
        for order in self.queue.drain(..) {
            if let Some(arena) = order.target.try_as::<Unit>() {
                arena.try_get_mut(order.target.index(), order.target.generation(), |unit| {
                    unit.hp -= order.amount;
                });
            }
        }
    }
}

struct CleanupSystem {
    dead: Arc<Mutex<Vec<Handle>>>,
}

impl SerialSystem for CleanupSystem {
    fn name(&self) -> &str {
        "cleanup"
    }
    fn process_serial(&mut self, _registry: &dyn Registry, handles: &[Handle], _context: &SystemContext) {
        for handle in handles {
            if let Some(arena) = handle.try_as::<Unit>() {
                let is_dead = arena
                    .try_get(handle.index(), handle.generation(), |unit| unit.hp <= 0)
                    .unwrap_or(false);
                if is_dead {
                    self.dead.lock().unwrap().push(handle.clone());
                    arena.deallocate(handle.index(), handle.generation(), |_| {});
                }
            }
        }
    }
}

fn context(delta: u32) -> SystemContext {
    SystemContext::new(TickCount::new(delta), foundry_core::TickId(delta as u64), CancellationToken::new())
}

#[test]
fn movement_and_damage_scenario() {
    let arena: Arc<dyn AnyArena> = Arc::new(Arena::<Unit>::new());
    let concrete = arena.downcast_ref::<Unit>().unwrap();

    let (i1, g1) = concrete.allocate(|u| { u.hp = 100; u.vx = 10.0; }).unwrap();
    let (i2, g2) = concrete.allocate(|u| { u.hp = 50; u.vx = -5.0; }).unwrap();
    let e1 = Handle::new(Arc::clone(&arena), i1, g1);
    let e2 = Handle::new(Arc::clone(&arena), i2, g2);

    let mut container = EntityContainer::new();
    container.add(e1.clone());
    container.add(e2.clone());
    let registry = UnitRegistry { container: Mutex::new(container) };

    let mut group = SystemGroup::new("tick", GroupMode::Serial);
    group.push(SystemNode::Serial(Box::new(MovementSystem)));
    group.push(SystemNode::Serial(Box::new(DamageSystem {
        queue: vec![DamageOrder { target: e2.clone(), amount: 35 }],
    })));

    let executor = Executor::new(WorkerPool::new(2));
    executor.run_group(&mut group, &registry, &context(1)).unwrap();

    let e1_x = concrete.try_get(i1, g1, |u| u.x).unwrap();
    let e2_x = concrete.try_get(i2, g2, |u| u.x).unwrap();
    let e1_hp = concrete.try_get(i1, g1, |u| u.hp).unwrap();
    let e2_hp = concrete.try_get(i2, g2, |u| u.hp).unwrap();

    assert_eq!(e1_x, 10.0);
    assert_eq!(e2_x, -5.0);
    assert_eq!(e1_hp, 100);
    assert_eq!(e2_hp, 15);
    assert!(concrete.is_valid(i1, g1));
    assert!(concrete.is_valid(i2, g2));
}

#[test]
fn cleanup_scenario_removes_dead_entity() {
    let arena: Arc<dyn AnyArena> = Arc::new(Arena::<Unit>::new());
    let concrete = arena.downcast_ref::<Unit>().unwrap();

    let (i2, g2) = concrete.allocate(|u| { u.hp = 50; u.vx = -5.0; }).unwrap();
    let e2 = Handle::new(Arc::clone(&arena), i2, g2);

    let mut container = EntityContainer::new();
    container.add(e2.clone());
    let registry = UnitRegistry { container: Mutex::new(container) };

    // First tick: 35 damage, survives at hp=15.
    let mut damage_group = SystemGroup::new("damage-tick", GroupMode::Serial);
    damage_group.push(SystemNode::Serial(Box::new(DamageSystem {
        queue: vec![DamageOrder { target: e2.clone(), amount: 35 }],
    })));
    let executor = Executor::new(WorkerPool::new(1));
    executor.run_group(&mut damage_group, &registry, &context(1)).unwrap();
    assert_eq!(concrete.try_get(i2, g2, |u| u.hp).unwrap(), 15);

    // Second tick: another 35 damage, now lethal.
    let mut damage_group_2 = SystemGroup::new("damage-tick-2", GroupMode::Serial);
    damage_group_2.push(SystemNode::Serial(Box::new(DamageSystem {
        queue: vec![DamageOrder { target: e2.clone(), amount: 35 }],
    })));
    executor.run_group(&mut damage_group_2, &registry, &context(1)).unwrap();

    let dead = Arc::new(Mutex::new(Vec::new()));
    let mut cleanup_group = SystemGroup::new("cleanup-tick", GroupMode::Serial);
    cleanup_group.push(SystemNode::Serial(Box::new(CleanupSystem { dead: Arc::clone(&dead) })));
    executor.run_group(&mut cleanup_group, &registry, &context(1)).unwrap();

    assert!(!concrete.is_valid(i2, g2));
    assert_eq!(dead.lock().unwrap().as_slice(), &[e2]);
}

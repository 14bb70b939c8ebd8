//! Randomized route operations checked against a model of the route set.
//!
//! After every step the routes reported by each endpoint must match the model
//! in both directions, and an emission must reach exactly the modelled
//! receivers of the emitting output.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use mgui_core::{add_route, remove_route, EventIn, EventOut};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SLOTS: usize = 6;
const STEPS: usize = 2_000;

struct World {
    outs: Vec<Option<EventOut<usize>>>,
    ins: Vec<Option<EventIn<usize>>>,
    /// (out index, in index) pairs that should be routed.
    model: BTreeSet<(usize, usize)>,
    /// (in index, payload) pairs received during the last emission.
    received: Rc<RefCell<Vec<(usize, usize)>>>,
}

impl World {
    fn new() -> Self {
        let received = Rc::new(RefCell::new(Vec::new()));
        let mut world = Self {
            outs: (0..SLOTS).map(|_| None).collect(),
            ins: (0..SLOTS).map(|_| None).collect(),
            model: BTreeSet::new(),
            received,
        };
        for i in 0..SLOTS {
            world.outs[i] = Some(EventOut::new());
            world.ins[i] = Some(world.make_in(i));
        }
        world
    }

    fn make_in(&self, index: usize) -> EventIn<usize> {
        let received = self.received.clone();
        EventIn::new(move |&payload: &usize| received.borrow_mut().push((index, payload)))
    }

    fn check(&self) {
        for (o, out) in self.outs.iter().enumerate() {
            let Some(out) = out else { continue };
            let expected = self.model.iter().filter(|(mo, _)| *mo == o).count();
            assert_eq!(out.route_count(), expected, "out {o} route count");

            for (i, input) in self.ins.iter().enumerate() {
                let Some(input) = input else { continue };
                let routed = self.model.contains(&(o, i));
                assert_eq!(out.is_routed_to(input), routed, "out {o} -> in {i}");
                assert_eq!(input.is_routed_from(out), routed, "in {i} <- out {o}");
            }
        }
        for (i, input) in self.ins.iter().enumerate() {
            let Some(input) = input else { continue };
            let expected = self.model.iter().filter(|(_, mi)| *mi == i).count();
            assert_eq!(input.route_count(), expected, "in {i} route count");
        }
    }

    fn emit_and_check(&self, o: usize, payload: usize) {
        let Some(out) = &self.outs[o] else { return };
        self.received.borrow_mut().clear();
        out.emit(payload);

        let got: BTreeSet<usize> = self.received.borrow().iter().map(|&(i, _)| i).collect();
        let want: BTreeSet<usize> = self
            .model
            .iter()
            .filter(|(mo, _)| *mo == o)
            .map(|&(_, i)| i)
            .collect();
        assert_eq!(got, want, "receivers of out {o}");
        assert_eq!(self.received.borrow().len(), want.len(), "each receiver called once");
        assert!(self.received.borrow().iter().all(|&(_, p)| p == payload));
    }
}

#[test]
fn random_route_operations_keep_routes_symmetric() {
    let mut rng = StdRng::seed_from_u64(0x6d67_7569);
    let mut world = World::new();

    for step in 0..STEPS {
        let o = rng.gen_range(0..SLOTS);
        let i = rng.gen_range(0..SLOTS);

        match rng.gen_range(0..7) {
            0 | 1 => {
                if let (Some(out), Some(input)) = (&world.outs[o], &world.ins[i]) {
                    let added = add_route(out, input);
                    assert_eq!(added, world.model.insert((o, i)), "step {step}: add");
                }
            }
            2 => {
                if let (Some(out), Some(input)) = (&world.outs[o], &world.ins[i]) {
                    let removed = remove_route(out, input);
                    assert_eq!(removed, world.model.remove(&(o, i)), "step {step}: remove");
                }
            }
            3 => {
                // Drop an output, or recreate it if already gone.
                if world.outs[o].take().is_some() {
                    world.model.retain(|(mo, _)| *mo != o);
                } else {
                    world.outs[o] = Some(EventOut::new());
                }
            }
            4 => {
                if world.ins[i].take().is_some() {
                    world.model.retain(|(_, mi)| *mi != i);
                } else {
                    world.ins[i] = Some(world.make_in(i));
                }
            }
            5 => {
                if let Some(input) = &world.ins[i] {
                    input.remove_all_routes();
                    world.model.retain(|(_, mi)| *mi != i);
                }
            }
            _ => world.emit_and_check(o, step),
        }

        world.check();
    }
}

#[test]
fn dropping_everything_leaves_no_routes() {
    let outs: Vec<EventOut<()>> = (0..4).map(|_| EventOut::new()).collect();
    let ins: Vec<EventIn<()>> = (0..4).map(|_| EventIn::new(|_| {})).collect();
    for out in &outs {
        for input in &ins {
            out.add_route(input);
        }
    }
    assert!(outs.iter().all(|o| o.route_count() == 4));

    drop(ins);
    assert!(outs.iter().all(|o| o.route_count() == 0));
}

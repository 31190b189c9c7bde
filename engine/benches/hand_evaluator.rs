//! Benchmark harness for hand evaluator throughput.
//!
//! Measures the 5-card and 3-card perfect-hash evaluators against a large
//! batch of random hands, regenerated against `ofc_engine::evaluator5`/
//! `evaluator3` in place of the teacher's `CactusKevEvaluator` placeholder.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ofc_engine::card::{full_deck, Card};
use ofc_engine::evaluator3::evaluate3;
use ofc_engine::evaluator5::evaluate5;

/// Simple LCG for deterministic random number generation, avoiding a
/// `rand` dependency inside the hot benchmark loop.
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Lcg { state: seed }
    }

    fn next(&mut self) -> u64 {
        self.state = (self.state.wrapping_mul(1103515245).wrapping_add(12345)) & 0x7fff_ffff;
        self.state
    }
}

fn generate_five_card_hands(count: usize, seed: u64) -> Vec<[Card; 5]> {
    let deck = full_deck();
    let mut lcg = Lcg::new(seed);
    let mut hands = Vec::with_capacity(count);

    for _ in 0..count {
        let mut indices = Vec::new();
        while indices.len() < 5 {
            let idx = (lcg.next() % 52) as usize;
            if !indices.contains(&idx) {
                indices.push(idx);
            }
        }
        hands.push([
            deck[indices[0]],
            deck[indices[1]],
            deck[indices[2]],
            deck[indices[3]],
            deck[indices[4]],
        ]);
    }

    hands
}

fn generate_three_card_hands(count: usize, seed: u64) -> Vec<[Card; 3]> {
    let deck = full_deck();
    let mut lcg = Lcg::new(seed);
    let mut hands = Vec::with_capacity(count);

    for _ in 0..count {
        let mut indices = Vec::new();
        while indices.len() < 3 {
            let idx = (lcg.next() % 52) as usize;
            if !indices.contains(&idx) {
                indices.push(idx);
            }
        }
        hands.push([deck[indices[0]], deck[indices[1]], deck[indices[2]]]);
    }

    hands
}

fn benchmark_evaluate5(c: &mut Criterion) {
    let hands = generate_five_card_hands(1_000_000, 12345);

    c.bench_function("evaluate5_1m_hands", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for hand in black_box(&hands) {
                let rank = evaluate5(*hand).unwrap();
                sum += rank.value() as u64;
            }
            black_box(sum)
        })
    });
}

fn benchmark_evaluate3(c: &mut Criterion) {
    let hands = generate_three_card_hands(1_000_000, 54321);

    c.bench_function("evaluate3_1m_hands", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for hand in black_box(&hands) {
                let rank = evaluate3(*hand).unwrap();
                sum += rank.value() as u64;
            }
            black_box(sum)
        })
    });
}

criterion_group!(benches, benchmark_evaluate5, benchmark_evaluate3);
criterion_main!(benches);

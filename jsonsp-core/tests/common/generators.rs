//! Stochastic generators for chunking and content variations
//!
//! Uses seeded RNG for reproducibility. Print seed on failure for replay
//! with `JSONSP_TEST_SEED=<seed>`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Number, Value};

/// Seeded generator for reproducible stochastic tests
pub struct Gen {
    pub rng: StdRng,
    pub seed: u64,
}

impl Gen {
    /// Create with specific seed (for reproduction)
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create from environment or random seed
    pub fn from_env_or_random() -> Self {
        let seed = std::env::var("JSONSP_TEST_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(rand::random);
        Self::new(seed)
    }

    /// Geometric distribution: count until rand > alpha
    pub fn geometric(&mut self, alpha: f64) -> usize {
        let mut n = 0;
        while self.rng.gen::<f64>() < alpha {
            n += 1;
        }
        n
    }

    /// Poisson-like count (simplified)
    pub fn poisson(&mut self, lambda: f64) -> usize {
        let l = (-lambda).exp();
        let mut k = 0;
        let mut p = 1.0;
        loop {
            k += 1;
            p *= self.rng.gen::<f64>();
            if p <= l {
                break;
            }
        }
        k - 1
    }

    /// Random boolean with probability p
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }

    /// Cut `input` at random byte positions, UTF-8 boundaries ignored.
    pub fn split<'a>(&mut self, input: &'a [u8]) -> Vec<&'a [u8]> {
        if input.is_empty() {
            return vec![input];
        }
        let cuts = self.rng.gen_range(0..=input.len().min(16));
        let mut points: Vec<usize> = (0..cuts).map(|_| self.rng.gen_range(0..=input.len())).collect();
        points.push(0);
        points.push(input.len());
        points.sort_unstable();
        points.dedup();
        points.windows(2).map(|w| &input[w[0]..w[1]]).collect()
    }

    /// Whitespace run, often empty
    pub fn whitespace(&mut self) -> String {
        let ws = [' ', '\t', '\n', '\r'];
        (0..self.geometric(0.4))
            .map(|_| ws[self.rng.gen_range(0..ws.len())])
            .collect()
    }

    /// String with escapes, multi-byte characters and control chars
    pub fn string(&mut self) -> String {
        let pool = ["a", "Z", "7", " ", "\"", "\\", "/", "\n", "\t", "\u{1}", "é", "€", "𝄞", "😀"];
        (0..self.geometric(0.8))
            .map(|_| pool[self.rng.gen_range(0..pool.len())])
            .collect()
    }

    /// Random JSON value nested at most `depth` levels
    pub fn value(&mut self, depth: usize) -> Value {
        let container = depth > 0 && self.chance(0.4);
        if container {
            let len = self.geometric(0.6);
            if self.chance(0.5) {
                Value::Array((0..len).map(|_| self.value(depth - 1)).collect())
            } else {
                let mut map = Map::new();
                for i in 0..len {
                    // Index suffix keeps keys unique.
                    map.insert(format!("{}{}", self.string(), i), self.value(depth - 1));
                }
                Value::Object(map)
            }
        } else {
            self.scalar()
        }
    }

    fn scalar(&mut self) -> Value {
        match self.rng.gen_range(0..7) {
            0 => Value::Null,
            1 => Value::Bool(self.chance(0.5)),
            2 => json!(self.rng.gen_range(-1000i64..1000)),
            3 => json!(self.rng.gen::<i64>()),
            4 => {
                let f: f64 = self.rng.gen_range(-1e6..1e6);
                Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
            }
            5 => {
                let f = self.rng.gen::<f64>() * 10f64.powi(self.rng.gen_range(-300..300));
                Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
            }
            _ => Value::String(self.string()),
        }
    }
}

//! Benchmark utilities for Batchline
pub mod utils {
    use bl_01_storage_access::Entity;
    use rand::Rng;
    use serde::{Deserialize, Serialize};

    /// Market tick used as the heavy-consumer payload.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Tick {
        pub timestamp_nanos: u64,
        pub symbol: String,
        pub price: f64,
        pub volume: u32,
    }

    impl Entity for Tick {
        const TABLE: &'static str = "ticks";
    }

    pub fn generate_ticks(count: usize) -> Vec<Tick> {
        const SYMBOLS: [&str; 4] = ["AAPL", "MSFT", "NVDA", "TSLA"];
        let mut rng = rand::thread_rng();
        (0..count)
            .map(|i| Tick {
                timestamp_nanos: i as u64,
                symbol: SYMBOLS[rng.gen_range(0..SYMBOLS.len())].to_string(),
                price: rng.gen_range(10.0..1_000.0),
                volume: rng.gen_range(1..10_000),
            })
            .collect()
    }
}

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Daily load curve in kWh per sample: low at night, peaks at 08:00 and 19:00.
fn base_load(minute_of_day: u32) -> f64 {
    let h = minute_of_day as f64 / 60.0;
    let morning = (-(h - 8.0).powi(2) / 2.0).exp();
    let evening = (-(h - 19.0).powi(2) / 3.0).exp();
    0.02 + 0.08 * morning + 0.12 * evening
}

fn timestamp(minutes: u32) -> String {
    let day = minutes / 1440 + 1;
    let hour = (minutes % 1440) / 60;
    let minute = minutes % 60;
    format!("2024-01-{day:02}T{hour:02}:{minute:02}")
}

const STEP_MINUTES: u32 = 5;
const DAYS: u32 = 7;
const NAN_EVERY: u32 = 500;
const SHORT_ROW_EVERY: u32 = 777;

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let output_path = "sample_mains.csv";

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(output_path)
        .context("creating output file")?;

    writer.write_record([
        "Time",
        "Sub_Mains_A_kWh",
        "Sub_Mains_B_kWh",
        "Sub_Mains_C_kWh",
        "Kitchen_kWh",
    ])?;

    let rows = DAYS * 1440 / STEP_MINUTES;
    for i in 0..rows {
        let minutes = i * STEP_MINUTES;
        let base = base_load(minutes % 1440);
        let mut phase = |scale: f64| base * scale + 0.01 * rng.next_f64();

        let a = format!("{:.4}", phase(1.0));
        let b = format!("{:.4}", phase(0.8));
        let c = if i % NAN_EVERY == NAN_EVERY - 1 {
            "NaN".to_string()
        } else {
            format!("{:.4}", phase(1.2))
        };
        let kitchen = format!("{:.4}", phase(0.3));

        if i % SHORT_ROW_EVERY == SHORT_ROW_EVERY - 1 {
            // Logger dropped the trailing columns.
            writer.write_record([timestamp(minutes), a, b])?;
        } else {
            writer.write_record([timestamp(minutes), a, b, c, kitchen])?;
        }
    }
    writer.flush().context("flushing output file")?;

    println!("Wrote {rows} readings ({DAYS} days at {STEP_MINUTES}-minute steps) to {output_path}");
    Ok(())
}

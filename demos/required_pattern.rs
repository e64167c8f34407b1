use offtargets_rs::{MatchParams, Matcher, Result};
use rand::{Rng, SeedableRng};

fn main() -> Result<()> {
    env_logger::init();

    // ---------------------------------------------------- //
    // 1. A random "genome" and 23-nt guides ending in a PAM
    // ---------------------------------------------------- //
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    const BASES: [u8; 4] = *b"ACGT";
    let genome: Vec<u8> = (0..200_000).map(|_| BASES[rng.random_range(0..4)]).collect();
    let guides: Vec<Vec<u8>> = (0..20_000)
        .map(|i| {
            // take some guides from the genome so there is something to find
            let mut g: Vec<u8> = if i % 1_000 == 0 {
                let at = rng.random_range(0..genome.len() - 23);
                genome[at..at + 23].to_vec()
            } else {
                (0..23).map(|_| BASES[rng.random_range(0..4)]).collect()
            };
            g[20..].copy_from_slice(b"NGG");
            g
        })
        .collect();

    // ---------------------------------------------------- //
    // 2. Only windows ending in NGG are compared; N is the wildcard
    // ---------------------------------------------------- //
    let params = MatchParams::new(3).with_required_pattern("NGG").with_wildcard(b'N');
    let matcher = Matcher::new(&guides, &params)?;
    match matcher.container().plan() {
        Some(p) => println!(
            "index: {} divisions x {} positions, {} tables",
            p.divisions,
            p.division_size,
            matcher.container().num_tables()
        ),
        None => println!("index declined, scanning linearly"),
    }

    // ---------------------------------------------------- //
    // 3. Scan and summarise
    // ---------------------------------------------------- //
    let (hits, stats) = matcher.scan_with_stats(&[&genome]);
    println!(
        "{} windows, {} rejected by the PAM, {} comparisons (naive: {})",
        stats.windows, stats.filtered, stats.comparisons, stats.naive_comparisons
    );
    for (i, list) in hits.iter().enumerate().filter(|(_, l)| !l.is_empty()) {
        for h in list {
            println!(
                "guide {i:5} at {:6}: {} ({} mismatches)",
                h.position,
                h.window_text(matcher.config()),
                h.mismatches
            );
        }
    }

    Ok(())
}

use offtargets_rs::{find_matches, MatchParams, PatternConfig, Result};

fn main() -> Result<()> {
    env_logger::init();

    // ---------------------------------------------------- //
    // 1. Sequences and targets
    // ---------------------------------------------------- //
    let sequences = ["ATCGTACGATGCATGCATGCTGACGNNACGATGCAAGCATGCTG", "TTTTGATGCATGCATTTT"];
    // All targets share one length (here 10)
    let targets = ["ACGATGCATG", "GCATGCATGC"];
    // Up to two substitutions per hit
    let params = MatchParams::new(2);

    // ---------------------------------------------------- //
    // 2. Search
    // ---------------------------------------------------- //
    let hits = find_matches(&sequences, &targets, &params)?;
    let config = PatternConfig::new(targets[0].len())?;

    // ---------------------------------------------------- //
    // 3. Report, one block per target
    // ---------------------------------------------------- //
    for (target, list) in targets.iter().zip(&hits) {
        println!("# {target}: {} hits", list.len());
        println!(" seq | start |  end | window     | mm");
        println!("-----+-------+------+------------+---");
        for h in list {
            println!(
                "{:4} | {:5} | {:4} | {} | {:2}",
                h.sequence,
                h.start(&config),
                h.position,
                h.window_text(&config),
                h.mismatches
            );
        }
        println!();
    }

    Ok(())
}

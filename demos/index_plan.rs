use offtargets_rs::DivisionPlan;

fn main() {
    // ---------------------------------------------------- //
    // Cost of every division count for a 20-nt guide, 4 mismatches
    // ---------------------------------------------------- //
    let variable = 20;
    let mismatches = 4;

    for targets in [1_000u64, 100_000, 10_000_000] {
        println!("# {targets} targets");
        println!(" div | size | mm/div | arr/div | work        | bytes");
        println!("-----+------+--------+---------+-------------+---------------------");
        for d in 1..=variable {
            if let Some(p) = DivisionPlan::evaluate(variable, mismatches, targets, d) {
                println!(
                    "{:4} | {:4} | {:6} | {:7} | {:11} | {}",
                    p.divisions,
                    p.division_size,
                    p.mismatches_per_division,
                    p.arrangements_per_division,
                    p.estimated_work,
                    p.estimated_bytes
                );
            }
        }
        match DivisionPlan::optimum(variable, mismatches, targets, u64::MAX) {
            Some(p) => println!("=> {} divisions\n", p.divisions),
            None => println!("=> linear scan\n"),
        }
    }
}

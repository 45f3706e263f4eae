use balanced_bst::config::BenchConfig;
use balanced_bst::{AvlTree, BinarySearchTree, SearchTree};
use log::{error, info};
use rand::prelude::*;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::time::{Duration, Instant};

fn init_logging(config: &BenchConfig) {
    if let Err(e) = TermLogger::init(
        config.log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("logger already initialized: {e}");
    }
}

fn time<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let out = f();
    (out, start.elapsed())
}

fn bench_tree<T: SearchTree<i32, i32>>(
    name: &str,
    tree: &mut T,
    keys: &[i32],
    lookups: &[i32],
) -> Duration {
    println!("\n[{name}]");
    let ((), insert) = time(|| {
        for &key in keys {
            tree.insert(key, key);
        }
    });
    println!("  -> Insert took:  {insert:?} (height {})", tree.height());

    let (hits, lookup) = time(|| lookups.iter().filter(|&&key| tree.get(&key).is_some()).count());
    println!("  -> Lookup took:  {lookup:?} ({hits} hits)");

    let ((), remove) = time(|| {
        for key in keys.iter().step_by(2) {
            tree.remove(key);
        }
    });
    println!("  -> Remove took:  {remove:?} ({} left)", tree.len());
    info!("{name}: balanced after removals = {}", tree.is_balanced());
    lookup
}

fn main() {
    let config = match BenchConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };
    init_logging(&config);
    info!("running with {config:?}");

    println!("*** AVL vs unbalanced BST in Rust ***");

    let size = i32::try_from(config.tree_size).unwrap_or(i32::MAX);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut keys: Vec<i32> = (0..size).collect();
    keys.shuffle(&mut rng);

    let lookups: Vec<i32> = (0..config.lookups)
        .map(|_| rng.random_range(0..size.max(1)))
        .collect();

    println!("\n--- {} keys, {} lookups ---", keys.len(), lookups.len());

    let mut bst = BinarySearchTree::new();
    let bst_lookup = bench_tree("BinarySearchTree", &mut bst, &keys, &lookups);

    let mut avl = AvlTree::new();
    let avl_lookup = bench_tree("AvlTree", &mut avl, &keys, &lookups);

    if let Err(e) = avl.check_balance_factors() {
        error!("AVL invariant broken: {e}");
        std::process::exit(1);
    }

    println!("\n--- Summary ({} Lookups) ---", lookups.len());
    println!("BinarySearchTree: {:>18.2?}", bst_lookup);
    println!("AvlTree:          {:>18.2?}", avl_lookup);

    #[cfg(target_arch = "x86_64")]
    bench_jit(&avl, &lookups, avl_lookup);
}

#[cfg(target_arch = "x86_64")]
fn bench_jit(avl: &AvlTree<i32, i32>, lookups: &[i32], generic: Duration) {
    use balanced_bst::jit;

    if avl.is_empty() {
        println!("\nTree is empty, skipping JIT benchmarks.");
        return;
    }

    println!("\n[JIT] Compiling AVL lookup with dynasm-rs...");
    let (compiled, compile) = time(|| jit::compile(avl));
    let compiled = match compiled {
        Ok(compiled) => compiled,
        Err(e) => {
            error!("JIT compilation failed: {e}");
            return;
        }
    };
    let (hits, run) = time(|| lookups.iter().filter(|&&key| compiled.get(key).is_some()).count());
    println!("  -> Dynasm compilation took: {compile:?}");
    println!("  -> Dynasm JIT lookup took:  {run:?} ({hits} hits)");
    println!(
        "\nSpeedup (Dynasm vs AvlTree):   {:.2}x",
        generic.as_secs_f64() / run.as_secs_f64()
    );
}

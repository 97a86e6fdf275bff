use clap::{clap_app, value_t, App, ArgMatches};
use markov_dp::logging::init_logging;
use markov_dp::{
    read_config_json, read_model_json, Result, Solution, SolverConfig, TerminalValue, ValueIterationConfig,
};
use tracing::info;

fn app() -> App<'static, 'static> {
    clap_app!(mdp_solve =>
        (version: "0.1")
        (author: "Thomas Robinson")
        (about: "Optimal policies for small, fully enumerated Markov Decision Processes")
        (@arg VERBOSE: -v --verbose ... "Level of verbosity \
        -v info: solver summaries
        -vv debug: every stage and sweep
        -vvv trace
        ")
        (@subcommand finite =>
            (about: "Backward induction over a fixed horizon")
            (@setting AllowNegativeNumbers)
            (@arg MODEL: -m --model <PATH> "MDP model, takes a json file in the form of e.g.
            {
              \"states\": [\"A\", \"B\"],
              \"actions\": [\"stay\", \"move\"],
              \"transitions\": [
                {\"s\": 0, \"a\": 0, \"s_prime\": [{\"s\": 0, \"p\": 1.0}]},
                {\"s\": 0, \"a\": 1, \"s_prime\": [{\"s\": 1, \"p\": 1.0}]},
                ...
              ],
              \"rewards\": {\"per_action\": [[1, 0], [0, 1]]}
            }
           ")
            (@arg HORIZON: -n --horizon <N> "Number of decision stages")
            (@arg BASELINE: -b --baseline [VALUE] "Terminal value is VALUE plus the best one step reward \
            of each state; zeros when omitted")
        )
        (@subcommand infinite =>
            (about: "Discounted value iteration to a fixed point")
            (@arg MODEL: -m --model <PATH> "MDP model json file")
            (@arg DISCOUNT: -g --discount [GAMMA] default_value("0.9") "Discount factor in [0, 1)")
            (@arg THRESHOLD: -e --threshold [EPS] default_value("0.000001") "Convergence threshold on the sweep delta")
            (@arg MAXITER: -i --("max-iterations") [N] default_value("10000") "Hard cap on the number of sweeps")
            (@arg STRICT: -s --strict "Exit with an error when the iteration cap is reached")
        )
        (@subcommand run =>
            (about: "Solve with the settings of a solver config json file")
            (@arg MODEL: -m --model <PATH> "MDP model json file")
            (@arg CONFIG: -c --config <PATH> "Solver config, e.g. {\"mode\": \"finite\", \"horizon\": 4}")
            (@arg STRICT: -s --strict "Exit with an error when the iteration cap is reached")
        )
    )
}

/// Model path, solver settings and whether non-convergence is fatal.
fn settings(matches: &ArgMatches) -> Result<Option<(String, SolverConfig, bool)>> {
    let settings = match matches.subcommand() {
        ("finite", Some(f)) => {
            let horizon = value_t!(f, "HORIZON", i64).unwrap_or_else(|e| e.exit());
            let terminal = if f.is_present("BASELINE") {
                TerminalValue::OneStep { baseline: value_t!(f, "BASELINE", f64).unwrap_or_else(|e| e.exit()) }
            } else {
                TerminalValue::Zeros
            };
            Some((model_path(f), SolverConfig::finite(horizon, terminal), false))
        }
        ("infinite", Some(f)) => {
            let config = ValueIterationConfig::new(
                value_t!(f, "DISCOUNT", f64).unwrap_or_else(|e| e.exit()),
                value_t!(f, "THRESHOLD", f64).unwrap_or_else(|e| e.exit()),
                value_t!(f, "MAXITER", usize).unwrap_or_else(|e| e.exit()),
            );
            Some((model_path(f), SolverConfig::infinite(config, None), f.is_present("STRICT")))
        }
        ("run", Some(f)) => {
            let config = read_config_json(f.value_of("CONFIG").unwrap_or_default())?;
            Some((model_path(f), config, f.is_present("STRICT")))
        }
        (_, _) => None,
    };
    Ok(settings)
}

fn model_path(f: &ArgMatches) -> String {
    f.value_of("MODEL").unwrap_or_default().to_string()
}

fn run(matches: &ArgMatches) -> Result<()> {
    let (path, config, strict) = match settings(matches)? {
        Some(x) => x,
        None => {
            eprintln!("{}", matches.usage());
            return Ok(());
        }
    };
    let model = read_model_json(&path)?;
    info!(path = %path, states = model.n_states(), actions = model.n_actions(), "model loaded");
    let solution = match config.solve(&model)? {
        Solution::Infinite(s) if strict => Solution::Infinite(s.ensure_converged()?),
        other => other,
    };
    let doc = solution.to_document(&model);
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn main() {
    let matches = app().get_matches();
    init_logging(matches.occurrences_of("VERBOSE"));
    if let Err(e) = run(&matches) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

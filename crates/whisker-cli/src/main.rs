use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use whisker_cli::evaluate::evaluator::run_evaluation_command;
use whisker_cli::evaluate::input::EvaluateConfig;
use whisker_cli::predict::input::PredictConfig;
use whisker_cli::predict::predictor::run_prediction;
use whisker_cli::train::input::TrainConfig;
use whisker_cli::train::trainer;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("WHISKER_LOG", "error,whisker=info"))
        .init();

    let matches = build_cli().get_matches();

    let result = match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("evaluate", sub_m)) => handle_evaluate(sub_m),
        Some(("predict", sub_m)) => handle_predict(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            log::error!("{:#}", e);
            std::process::exit(1)
        }
    }
}

fn config_arg(help: &'static str) -> Arg {
    Arg::new("config")
        .help(help)
        .required(true)
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn data_dir_arg() -> Arg {
    Arg::new("data_dir")
        .short('d')
        .long("data_dir")
        .value_parser(clap::builder::NonEmptyStringValueParser::new())
        .help(
            "Dataset root holding train/ and test/ class folders. \
             Overrides the data_dir specified in the configuration file.",
        )
        .value_hint(ValueHint::DirPath)
}

fn build_cli() -> Command {
    Command::new("whisker")
        .version(clap::crate_version!())
        .about("\u{1F408} Whisker CLI - logistic regression image classifier")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Train a classifier on the train/ split of an image-folder dataset")
                .arg(config_arg("Path to training configuration file"))
                .arg(data_dir_arg())
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output_file")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "File path that the trained model will be written to. \
                             Overrides the output_file specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("learning_rate")
                        .long("learning-rate")
                        .help("Gradient descent step size.")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("iterations")
                        .long("iterations")
                        .help("Number of gradient descent iterations.")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("no_report")
                        .long("no-report")
                        .help("Disable HTML report generation.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("evaluate")
                .about("Score a trained model on the test/ split and print the metrics as JSON")
                .arg(config_arg("Path to evaluation (or training) configuration file"))
                .arg(data_dir_arg())
                .arg(
                    Arg::new("model_path")
                        .short('m')
                        .long("model")
                        .help("Path to the trained model file")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output_file")
                        .help("Also write the evaluation JSON to this file")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("report_file")
                        .long("report")
                        .help("Write an HTML report with the test set probability histogram")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Classify image files or folders of images with a trained model")
                .arg(
                    Arg::new("model_path")
                        .short('m')
                        .long("model")
                        .help("Path to the trained model file")
                        .required(true)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("inputs")
                        .help("Image files or folders of images")
                        .required(true)
                        .num_args(1..)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::AnyPath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output_file")
                        .help("Path to the output file for predictions (*.tsv or *.csv). Defaults to stdout.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("width")
                        .long("width")
                        .help("Resize width used at training time. Inferred for square models.")
                        .value_parser(clap::value_parser!(u32).range(1..)),
                )
                .arg(
                    Arg::new("height")
                        .long("height")
                        .help("Resize height used at training time. Inferred for square models.")
                        .value_parser(clap::value_parser!(u32).range(1..)),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config_path: &PathBuf = matches
        .get_one("config")
        .ok_or_else(|| anyhow::anyhow!("config path is required"))?;
    log::info!("[Whisker::Train] Training from config: {:?}", config_path);

    let params = TrainConfig::from_arguments(config_path, matches)?;
    let model = trainer::run_training(&params)?;
    log::info!(
        "[Whisker::Train] Done; {} costs recorded",
        model.costs().len()
    );
    Ok(())
}

fn handle_evaluate(matches: &ArgMatches) -> Result<()> {
    let config_path: &PathBuf = matches
        .get_one("config")
        .ok_or_else(|| anyhow::anyhow!("config path is required"))?;
    log::info!("[Whisker::Evaluate] Evaluating with config: {:?}", config_path);

    let params = EvaluateConfig::from_arguments(config_path, matches)?;
    let report = run_evaluation_command(&params)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let params = PredictConfig::from_arguments(matches)?;
    log::info!(
        "[Whisker::Predict] Classifying {} images with {}",
        params.inputs.len(),
        params.model_path
    );
    let (rows, _stats) = run_prediction(&params)?;
    if rows.len() < params.inputs.len() {
        log::warn!(
            "{} of {} inputs could not be classified",
            params.inputs.len() - rows.len(),
            params.inputs.len()
        );
    }
    Ok(())
}

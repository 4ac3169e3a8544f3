use anyhow::Result;
use clap::Parser;
use fitrec::services::clothing::ClothingRecommender;
use fitrec::services::dataset::{ClothingDataset, ColorDataset};
use fitrec::services::season::{SeasonClassifierBank, SeasonColorAggregator};
use fitrec::utils::metrics::mean_accuracy;
use fitrec::{init_tracing, Config};
use tracing::{info, warn};

/// Trains every classifier once and reports holdout accuracy.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", &args.log_level);
    }
    init_tracing();

    let config = Config::load_or_default(&args.config)?;
    info!("Training configuration loaded: {:?}", config.training);

    let clothing = ClothingDataset::load_or_fallback(&config.data.clothing_path);
    info!("Clothing dataset: {} rows from {:?}", clothing.len(), clothing.source());
    let recommender = ClothingRecommender::new(clothing, &config.training)?;

    let clothing_reports = recommender.training_report();
    for report in &clothing_reports {
        info!("{}", report);
    }
    for category in recommender.get_clothing_categories() {
        if !recommender.trained_categories().any(|c| c == category.as_str()) {
            warn!("No classifier for '{}': not enough rows", category);
        }
    }
    match mean_accuracy(&clothing_reports) {
        Some(acc) => info!("Clothing classifiers: mean holdout accuracy {:.3}", acc),
        None => info!("Clothing classifiers: no holdout accuracy available"),
    }

    let colors = ColorDataset::load_or_fallback(&config.data.season_path);
    info!("Colour dataset: {} rows from {:?}", colors.len(), colors.source());
    let bank = SeasonClassifierBank::train(&colors, &config.training)?;
    for report in bank.reports() {
        info!("{}", report);
    }

    // Compare the classifier bank against the frequency ranking served by the API.
    let aggregator = SeasonColorAggregator::new(colors, config.recommendation.palette_size)?;
    for season in aggregator.get_seasons() {
        let ranked = aggregator.get_season_recommendations(season)?;
        let (color, combination) = bank.predict(season)?;
        info!(
            "{}: classifier picks {} / {}, frequency ranking leads with {:?} / {:?}",
            season,
            color,
            combination,
            ranked.complementary_colors.first(),
            ranked.color_combinations.first()
        );
    }
    if let Some(acc) = mean_accuracy(bank.reports()) {
        info!("Season classifiers: mean holdout accuracy {:.3}", acc);
    }

    Ok(())
}

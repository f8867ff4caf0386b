use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use healthkey_core::{
    EmergencyProfile, HealthKeyConfig, VitalMetric, VitalRanges, VitalSigns, VitalThresholds,
};
use healthkey_emergency::{share_card, token_from_link, EmergencyView, QrServerImage};
use healthkey_vitals::{
    any_critical, check_in_score, dispatch_critical, message, Classifier, DeviationClassifier,
    HealthScore, HealthScoreInputs, IntervalClassifier, ReadingLog, ReadingReport,
    TracingTransport,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "healthkey-cli",
    about = "Tạo thẻ sức khỏe khẩn cấp và phân loại chỉ số sống."
)]
struct Args {
    /// File cấu hình JSON (tùy chọn).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Tăng mức log (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mã hóa hồ sơ JSON thành token, link và URL ảnh QR.
    Encode {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Giải mã token hoặc link khẩn cấp.
    Decode { token_or_link: String },
    /// Phân loại một giá trị chỉ số sống.
    Classify {
        metric: String,
        value: f64,
        /// Giá trị tâm trương khi metric là bloodPressure.
        #[arg(long)]
        companion: Option<f64>,
        #[arg(long, value_enum, default_value_t = Table::Interval)]
        table: Table,
        /// Ghi đè bảng ngưỡng (JSON).
        #[arg(long)]
        thresholds: Option<PathBuf>,
        /// Ghi đè bảng range cũ (JSON).
        #[arg(long)]
        ranges: Option<PathBuf>,
    },
    /// Tính điểm sức khỏe từ lịch sử đo và hồ sơ.
    Score {
        /// Danh sách lần đo (JSON array).
        #[arg(long)]
        readings: PathBuf,
        /// Hồ sơ dùng để tính độ đầy đủ.
        #[arg(long)]
        profile: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        doses_taken: u32,
        #[arg(long, default_value_t = 0)]
        doses_scheduled: u32,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Table {
    /// Bảng ngưỡng nhiều mức.
    Interval,
    /// Bảng range cũ, phân loại theo độ lệch.
    Deviation,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => HealthKeyConfig::from_json_str(&read_file(path)?)?,
        None => HealthKeyConfig::default(),
    };
    tracing::debug!(?config, "configuration loaded");

    match args.command {
        Command::Encode { input } => encode(&input, &config),
        Command::Decode { token_or_link } => decode(&token_or_link),
        Command::Classify {
            metric,
            value,
            companion,
            table,
            thresholds,
            ranges,
        } => {
            let classifier =
                build_classifier(table, thresholds.as_deref(), ranges.as_deref(), &config)?;
            classify(classifier.as_ref(), &metric, value, companion)
        }
        Command::Score {
            readings,
            profile,
            doses_taken,
            doses_scheduled,
        } => score(&readings, profile.as_deref(), doses_taken, doses_scheduled, &config),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Không đọc được file {path:?}"))
}

fn encode(input: &Path, config: &HealthKeyConfig) -> anyhow::Result<()> {
    let profile: EmergencyProfile = serde_json::from_str(&read_file(input)?)
        .with_context(|| format!("Hồ sơ không hợp lệ: {input:?}"))?;
    let card = share_card(&profile, config, &QrServerImage::from_config(config))?;

    println!("Token: {}\nLink: {}\nQR image: {}", card.token, card.link, card.qr_image);
    Ok(())
}

fn decode(token_or_link: &str) -> anyhow::Result<()> {
    let token = if token_or_link.contains("://") {
        token_from_link(token_or_link).unwrap_or_default()
    } else {
        token_or_link.to_string()
    };

    let view = EmergencyView::from_token(&token);
    println!("{}", serde_json::to_string_pretty(&view)?);
    if view.is_invalid() {
        anyhow::bail!("Thẻ khẩn cấp không hợp lệ");
    }
    Ok(())
}

fn build_classifier(
    table: Table,
    thresholds: Option<&Path>,
    ranges: Option<&Path>,
    config: &HealthKeyConfig,
) -> anyhow::Result<Box<dyn Classifier>> {
    let classifier: Box<dyn Classifier> = match table {
        Table::Interval => {
            let thresholds = match thresholds {
                Some(path) => VitalThresholds::from_json_str(&read_file(path)?)?,
                None => VitalThresholds::default(),
            };
            Box::new(IntervalClassifier::new(thresholds))
        }
        Table::Deviation => {
            let ranges = match ranges {
                Some(path) => VitalRanges::from_json_str(&read_file(path)?)?,
                None => VitalRanges::default(),
            };
            Box::new(DeviationClassifier::from_config(ranges, config))
        }
    };
    Ok(classifier)
}

fn classify(
    classifier: &dyn Classifier,
    metric: &str,
    value: f64,
    companion: Option<f64>,
) -> anyhow::Result<()> {
    let metric: VitalMetric = metric.parse()?;
    let status = classifier.classify_metric(metric, value, companion);

    println!(
        "{}: {} ({})\n{}",
        metric.display_name(),
        status.label(),
        status.color(),
        message(metric, value, status)
    );
    Ok(())
}

fn score(
    readings_path: &Path,
    profile_path: Option<&Path>,
    doses_taken: u32,
    doses_scheduled: u32,
    config: &HealthKeyConfig,
) -> anyhow::Result<()> {
    let readings: Vec<VitalSigns> = serde_json::from_str(&read_file(readings_path)?)
        .with_context(|| format!("Lịch sử đo không hợp lệ: {readings_path:?}"))?;

    let mut log = ReadingLog::new();
    for reading in readings {
        log.record(reading)?;
    }

    let profile = match profile_path {
        Some(path) => serde_json::from_str(&read_file(path)?)
            .with_context(|| format!("Hồ sơ không hợp lệ: {path:?}"))?,
        None => EmergencyProfile::default(),
    };

    let classifier = IntervalClassifier::default();
    if let Some(latest) = log.latest() {
        dispatch_critical(&ReadingReport::classify(latest, &classifier), &TracingTransport);
    }
    let has_critical_vital = any_critical(log.iter(), &classifier);

    let inputs = HealthScoreInputs {
        medication_adherence: healthkey_vitals::adherence_score(doses_taken, doses_scheduled),
        profile_completeness: healthkey_vitals::completeness_score(&profile),
        check_in_frequency: check_in_score(
            log.timestamps(),
            Utc::now(),
            config.check_in_window_days,
        ),
        has_critical_vital,
    };
    let score = HealthScore::from_config(&inputs, config);

    println!(
        "Health score: {}\nWeighted: {} | Penalty: {}\nAdherence: {:.0} | Completeness: {:.0} | Check-in: {:.0}",
        score.total,
        score.weighted,
        score.penalty,
        score.medication_adherence,
        score.profile_completeness,
        score.check_in_frequency
    );
    Ok(())
}

use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    ConnectionConfig, RunConfig, DEFAULT_BATCH_SIZE, DEFAULT_FIELD_COLUMNS, DEFAULT_METRIC,
    DEFAULT_SERVER, DEFAULT_TAG_COLUMNS, DEFAULT_TIME_COLUMN, DEFAULT_TIME_FORMAT,
};
use crate::error::Result;
use crate::infer::NanSentinels;
use crate::timestamp::parse_timezone;

/// CSV to InfluxDB - imports a delimited file as tagged, timestamped points
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input CSV file
    #[arg(short, long)]
    pub input: PathBuf,

    /// CSV delimiter, a single character ("\t" or "tab" for tabs)
    #[arg(short, long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Server address
    #[arg(short, long, default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Use HTTPS instead of HTTP
    #[arg(long)]
    pub ssl: bool,

    /// User name
    #[arg(short, long, default_value = "root")]
    pub user: String,

    /// Password
    #[arg(short, long, default_value = "root")]
    pub password: String,

    /// Database name
    #[arg(long)]
    pub dbname: String,

    /// Drop the database and create a new one
    #[arg(long)]
    pub create: bool,

    /// Measurement name
    #[arg(short = 'm', long, default_value = DEFAULT_METRIC)]
    pub metricname: String,

    /// Timestamp column name
    #[arg(long, visible_alias = "tc", default_value = DEFAULT_TIME_COLUMN)]
    pub timecolumn: String,

    /// Timestamp format, e.g. 1970-01-01 00:00:00
    #[arg(long, visible_alias = "tf", default_value = DEFAULT_TIME_FORMAT)]
    pub timeformat: String,

    /// Timezone of the supplied data
    #[arg(long, visible_alias = "tz", default_value = "UTC")]
    pub timezone: String,

    /// CSV columns to use as fields, e.g. value1,value2:renamed
    #[arg(long, default_value = DEFAULT_FIELD_COLUMNS)]
    pub fieldcolumns: String,

    /// CSV columns to use as tags, or static tags, e.g. host,dc:datacenter,env=prod
    #[arg(long, default_value = DEFAULT_TAG_COLUMNS)]
    pub tagcolumns: String,

    /// CSV columns checked for NaN; matching rows are skipped
    #[arg(short = 'x', long, default_value = "")]
    pub ignorenancolumns: String,

    /// Values treated as NaN in the ignore columns, comma separated
    #[arg(long, default_value = "NaN")]
    pub nanvalues: String,

    /// Accepted for compatibility; points are always sent uncompressed
    #[arg(short, long)]
    pub gzip: bool,

    /// Batch size
    #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batchsize: usize,

    /// Also write debug logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

fn parse_delimiter(s: &str) -> std::result::Result<u8, String> {
    match s {
        "\\t" | "\t" | "tab" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [b] => Ok(*b),
            _ => Err(format!("delimiter must be a single byte, got '{}'", s)),
        },
    }
}

impl Cli {
    pub fn run_config(&self) -> Result<RunConfig> {
        let config = RunConfig {
            delimiter: self.delimiter,
            measurement: self.metricname.clone(),
            time_column: self.timecolumn.clone(),
            time_format: self.timeformat.clone(),
            timezone: parse_timezone(&self.timezone)?,
            nan_sentinels: NanSentinels::new(self.nanvalues.split(',')),
            batch_size: self.batchsize,
            ..RunConfig::default()
        }
        .with_field_spec(&self.fieldcolumns)
        .with_tag_spec(&self.tagcolumns)
        .with_nan_spec(&self.ignorenancolumns);

        config.validate()?;
        Ok(config)
    }

    pub fn connection(&self) -> Result<ConnectionConfig> {
        Ok(ConnectionConfig {
            server: self.server.parse()?,
            ssl: self.ssl,
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.dbname.clone(),
            recreate: self.create,
            gzip: self.gzip,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{ColumnMapping, StaticTag};

    #[test]
    fn test_defaults() {
        let cli =
            Cli::try_parse_from(["csv2influx", "-i", "data.csv", "--dbname", "metrics"]).unwrap();
        let config = cli.run_config().unwrap();
        let conn = cli.connection().unwrap();

        assert_eq!(config.delimiter, b',');
        assert_eq!(config.measurement, "value");
        assert_eq!(config.time_column, "timestamp");
        assert_eq!(config.time_format, "%Y-%m-%d %H:%M:%S");
        assert_eq!(config.batch_size, 5000);
        assert!(config.nan_sentinels.contains("NaN"));
        assert_eq!(conn.url(), "http://localhost:8086");
        assert_eq!(conn.user, "root");
        assert!(!conn.recreate);
    }

    #[test]
    fn test_full_command_line() {
        let cli = Cli::try_parse_from([
            "csv2influx",
            "-i",
            "data.tsv",
            "-d",
            "tab",
            "-s",
            "influx:8087",
            "--ssl",
            "--dbname",
            "metrics",
            "--create",
            "-m",
            "cpu",
            "--tc",
            "time",
            "--tz",
            "Europe/Berlin",
            "--fieldcolumns",
            "load:cpu_load",
            "--tagcolumns",
            "host,env=prod",
            "-x",
            "load",
            "-b",
            "100",
        ])
        .unwrap();
        let config = cli.run_config().unwrap();
        let conn = cli.connection().unwrap();

        assert_eq!(config.delimiter, b'\t');
        assert_eq!(config.measurement, "cpu");
        assert_eq!(config.time_column, "time");
        assert_eq!(config.fields, vec![ColumnMapping::new("load", "cpu_load")]);
        assert_eq!(config.static_tags, vec![StaticTag::new("env", "prod")]);
        assert_eq!(config.nan_columns, vec!["load".to_string()]);
        assert_eq!(config.batch_size, 100);
        assert_eq!(conn.url(), "https://influx:8087");
        assert!(conn.recreate);
    }

    #[test]
    fn test_gzip_help_says_uncompressed() {
        use clap::CommandFactory;

        let cmd = Cli::command();
        let gzip = cmd
            .get_arguments()
            .find(|arg| arg.get_id() == "gzip")
            .unwrap();
        let help = gzip.get_help().unwrap().to_string();
        assert!(help.contains("uncompressed"));

        let cli = Cli::try_parse_from(["csv2influx", "-i", "a.csv", "--dbname", "db", "-g"]).unwrap();
        assert!(cli.connection().unwrap().gzip);
    }

    #[test]
    fn test_invalid_values() {
        let base = ["csv2influx", "-i", "a.csv", "--dbname", "db"];
        let with = move |extra: [&'static str; 2]| base.into_iter().chain(extra);

        assert!(Cli::try_parse_from(with(["-d", ";;"])).is_err());
        assert!(Cli::try_parse_from(with(["-s", "nohost"]))
            .unwrap()
            .connection()
            .is_err());

        let cli = Cli::try_parse_from(with(["--tz", "Nowhere"])).unwrap();
        assert!(cli.run_config().is_err());

        let cli = Cli::try_parse_from(with(["-b", "0"])).unwrap();
        assert!(cli.run_config().is_err());
    }
}

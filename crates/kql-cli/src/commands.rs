use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "kql-sql")]
#[command(
    about = "Transpiles a KQL pipeline query into ClickHouse-flavoured SQL",
    long_about = None,
    version = env!("CARGO_PKG_VERSION")
)]
pub(crate) struct Cli {
    /// The KQL query to transpile. Reads stdin when omitted.
    pub query: Option<String>,
    /// Target SQL dialect. Only `clickhouse` is implemented today.
    #[arg(long, default_value = "clickhouse")]
    pub dialect: String,
    /// Print the recognised stage plan before the SQL.
    #[arg(long, default_value_t = false)]
    pub explain: bool,
}

use clap::Parser;

/// This is a customer satisfaction report program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the survey sources and the report.
    /// For more information about the file format, read the documentation of the `manual` module.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference report in JSON format. If provided, survey-report will
    /// check that the computed report matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the report will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The in-store survey export. Setting this option overrides the offline
    /// source of the --config option.
    #[clap(long, value_parser)]
    pub offline: Option<String>,

    /// (file path or empty) The online survey export. Setting this option overrides the online
    /// source of the --config option.
    #[clap(long, value_parser)]
    pub online: Option<String>,

    /// (default csv) The type of the inputs given with --offline and --online: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using Excel files given with --offline and --online, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (for example 2024-09) The month of the report.
    #[clap(short, long, value_parser)]
    pub month: Option<String>,

    /// (for example 2024-08) The month the report is compared to.
    #[clap(long, value_parser)]
    pub previous_month: Option<String>,

    /// (list of comma-separated values or not specified) The stores to report on, in display order.
    #[clap(long, value_parser, use_value_delimiter = true)]
    pub stores: Option<Vec<String>>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

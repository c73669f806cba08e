//! Fixed inputs per analysis family.
//!
//! Each family reads one or more CSVs from the data directory. The raw
//! headers below are exactly what the published files carry (footnote
//! digits, embedded newlines and all); the renames map them onto the
//! canonical names the pipelines and reports use.

/// Monitoring-site file stems and the city each one stands for. Each site
/// lives in `{stem}.csv`.
pub const AIR_SITES: [(&str, &str); 6] = [
    ("birmingham-a4540-roadside", "Birmingham"),
    ("edinburgh-st-leonards", "Edinburgh"),
    ("glasgow-kerbside", "Glasgow"),
    ("london-marylebone-road", "London"),
    ("manchester-piccadilly", "Manchester"),
    ("newcastle-centre", "Newcastle"),
];

/// The pollutant reading column in every site file.
pub const AIR_READING_COLUMN: &str = "Nitrogen dioxide";

pub const STRINGENCY_FILE: &str = "stringency.csv";
pub const STRINGENCY_RENAMES: [(&str, &str); 1] = [("StringencyIndex", "Stringency")];
pub const STRINGENCY_COLUMN: &str = "Stringency";

pub const TRANSPORT_FILE: &str = "transport_use.csv";

/// The raw date header carries a footnote and an embedded newline.
pub const TRANSPORT_DATE_RAW: &str = "Date1\n (weekends and bank holidays in grey)";

pub const TRANSPORT_RENAMES: [(&str, &str); 10] = [
    (TRANSPORT_DATE_RAW, "Date"),
    ("Cars2", "Cars"),
    ("Light Commercial Vehicles2", "Light Commercial Vehicles"),
    ("Heavy Goods Vehicles2", "Heavy Goods Vehicles"),
    ("All motor vehicles2", "All motor vehicles"),
    ("National Rail3,4", "National Rail"),
    ("Transport for London Tube5", "Transport for London Tube"),
    ("Transport for London Bus5,7", "Transport for London Bus"),
    ("Bus (excl. London)6,8,9", "Bus (excl. London)"),
    ("Cycling10,11", "Cycling"),
];

/// Canonical transport modes, in published column order.
pub const TRANSPORT_MODES: [&str; 9] = [
    "Cars",
    "Light Commercial Vehicles",
    "Heavy Goods Vehicles",
    "All motor vehicles",
    "National Rail",
    "Transport for London Tube",
    "Transport for London Bus",
    "Bus (excl. London)",
    "Cycling",
];

/// The public-transit subset averaged into one series.
pub const TRANSIT_MODES: [&str; 4] = [
    "National Rail",
    "Transport for London Tube",
    "Transport for London Bus",
    "Bus (excl. London)",
];

pub const AVG_TRANSIT_COLUMN: &str = "Average Public Transport";

pub const MOBILITY_FILE: &str = "mobility.csv";
pub const MOBILITY_DATE_RAW: &str = "date";

pub const MOBILITY_RENAMES: [(&str, &str); 8] = [
    ("sub_region_1", "Region"),
    ("date", "Date"),
    (
        "retail_and_recreation_percent_change_from_baseline",
        "Retail and Recreation",
    ),
    (
        "grocery_and_pharmacy_percent_change_from_baseline",
        "Grocery and Pharmacy",
    ),
    ("parks_percent_change_from_baseline", "Parks"),
    (
        "transit_stations_percent_change_from_baseline",
        "Transit Stations",
    ),
    ("workplaces_percent_change_from_baseline", "Workplaces"),
    ("residential_percent_change_from_baseline", "Residential"),
];

pub const MOBILITY_REGIONS: [&str; 6] = [
    "Greater Manchester",
    "Greater London",
    "West Midlands",
    "Tyne and Wear",
    "Edinburgh",
    "Glasgow City",
];

pub const MOBILITY_CATEGORIES: [&str; 6] = [
    "Retail and Recreation",
    "Grocery and Pharmacy",
    "Parks",
    "Transit Stations",
    "Workplaces",
    "Residential",
];

pub const SECTOR_PRICES_FILE: &str = "sector_prices.csv";
pub const SECTOR_LIST_FILE: &str = "sector_industries.csv";

/// Shared by both sector files; the prices file only carries the ticker.
pub const SECTOR_RENAMES: [(&str, &str); 2] = [
    ("ticker", "Ticker"),
    ("industryclassification", "Industry"),
];

pub const ESG_FILE: &str = "esg_scores.csv";
pub const ESG_RENAMES: [(&str, &str); 1] = [("Total ESG Risk Score", "ESG Score")];
pub const ESG_SCORE_COLUMN: &str = "ESG Score";

pub const TICKER_COLUMN: &str = "Ticker";
pub const INDUSTRY_COLUMN: &str = "Industry";
pub const DATE_COLUMN: &str = "Date";
pub const MONTH_COLUMN: &str = "Month";
pub const REGION_COLUMN: &str = "Region";

pub const BASELINE_MEAN_COLUMN: &str = "Baseline Mean";
pub const COMPARISON_MEAN_COLUMN: &str = "Comparison Mean";

/// Columns a daily price history carries beyond its date.
pub const PRICE_COLUMNS: [&str; 5] = ["Open", "High", "Low", "Close", "Volume"];

pub const PREDICTED_COLUMN: &str = "Predicted";

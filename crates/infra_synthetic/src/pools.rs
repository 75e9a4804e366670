//! Candidate value pools.

// Trades
pub const TRADE_STATUSES: &[&str] = &["NEW", "PENDING", "COMPLETED", "CANCELLED"];
pub const PTS: &[&str] = &["MARTINI", "MANHATTAN", "MOJITO"];
pub const PRODUCT_TYPES: &[&str] = &["COLLATERAL", "SWAP", "FUTURE", "OPTION"];
pub const PRODUCT_SUBTYPES: &[&str] = &["CLR", "STD", "FWD"];
pub const CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "JPY"];
pub const COLLAT_TYPES: &[&str] = &["EURABS", "USABS", "GOVTBOND"];
pub const FUNDING_LEG_TYPES: &[&str] = &["fixedRate", "floatingRate"];
pub const FX_PAIRS: &[&str] = &["USDEUR", "USDJPY", "EURGBP", "EURUSD"];
pub const PORTFOLIOS: &[&str] = &["PORT_1", "PORT_2", "PORT_3", "PORT_4"];

// Counterparties
pub const COUNTERPARTY_TYPES: &[&str] =
    &["BANK", "HEDGE_FUND", "ASSET_MANAGER", "BROKER", "CORPORATE"];
pub const REGIONS: &[&str] = &["EMEA", "APAC", "AMER"];
pub const SECTORS: &[&str] = &["FINANCIAL", "TECHNOLOGY", "ENERGY", "HEALTHCARE", "INDUSTRIAL"];
pub const INDUSTRIES: &[&str] = &[
    "BANKING",
    "SOFTWARE",
    "OIL_AND_GAS",
    "PHARMACEUTICALS",
    "MANUFACTURING",
];
pub const RATINGS: &[&str] = &["AAA", "AA+", "AA", "AA-", "A+", "A", "A-", "BBB+", "BBB", "BBB-"];
pub const RATING_AGENCIES: &[&str] = &["SP", "MOODYS", "FITCH"];
pub const COUNTERPARTY_STATUSES: &[&str] = &["ACTIVE", "INACTIVE", "PENDING", "SUSPENDED"];
pub const COUNTRY_CODES: &[&str] = &[
    "US", "GB", "DE", "FR", "JP", "CH", "NL", "SG", "HK", "CA", "AU", "IT", "ES", "SE", "IE",
];

// Instruments
pub const INSTRUMENT_TYPES: &[&str] = &["BOND", "EQUITY", "FUTURE", "OPTION", "SWAP"];
pub const INSTRUMENT_STATUSES: &[&str] = &["ACTIVE", "INACTIVE", "SUSPENDED"];

// Books
pub const DESKS: &[&str] = &["EQUITY", "FIXED_INCOME", "FX", "COMMODITIES", "RATES"];

// Risk aggregates
pub const BUSINESS_UNITS: &[&str] = &[
    "Structured Index Products",
    "Cash Financing Sol",
    "Structured Commodity Products",
    "Structured Equity Products",
];
pub const SUB_BUSINESS_UNITS: &[&str] = &["RATES", "CREDIT", "FX_SPOT", "FX_FWD"];
pub const VC_PRODUCTS: &[&str] = &["BOND", "SWAP", "FUTURE", "OPTION"];
pub const VC_PRODUCT_GROUPS: &[&str] = &["RATES", "CREDIT", "FX", "EQUITY"];

// Names and text
pub const SURNAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Miller", "Davis", "Wilson", "Anderson",
    "Taylor", "Thomas", "Moore", "Martin", "Jackson", "Thompson", "White", "Harris", "Clark",
    "Lewis", "Walker", "Hall", "Young", "King", "Wright", "Scott", "Green", "Baker", "Adams",
    "Nelson", "Hill", "Campbell", "Mitchell", "Roberts", "Carter", "Phillips", "Evans",
];
pub const COMPANY_SUFFIXES: &[&str] = &[
    "Capital", "Holdings", "Partners", "Group", "Securities", "Asset Management", "Bank",
    "Investments", "Trust", "& Co",
];
pub const COMPANY_FORMS: &[&str] = &["LLC", "Ltd", "PLC", "Inc", "AG", "SA"];
pub const DESCRIPTION_WORDS: &[&str] = &[
    "senior", "secured", "floating", "fixed", "coupon", "note", "issued", "under", "programme",
    "callable", "subordinated", "series", "tranche", "listed", "eligible", "collateral", "repo",
    "government", "agency", "covered", "bond", "equity", "basket", "index", "linked",
];

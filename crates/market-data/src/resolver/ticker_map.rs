//! Static vendor name to ticker mapping.
//!
//! Keys are pre-normalized (uppercase, no punctuation, no corporate
//! suffixes). A `None` ticker marks a vendor known to be privately held, so
//! a partial-match hit on it resolves to "not public" instead of falling
//! through to a wrong ticker.

pub(crate) const VENDOR_TICKERS: &[(&str, Option<&str>)] = &[
    // Tech
    ("AMAZON", Some("AMZN")),
    ("AMAZON WEB SERVICES", Some("AMZN")),
    ("AWS", Some("AMZN")),
    ("MICROSOFT", Some("MSFT")),
    ("AZURE", Some("MSFT")),
    ("GOOGLE", Some("GOOGL")),
    ("ALPHABET", Some("GOOGL")),
    ("GCP", Some("GOOGL")),
    ("APPLE", Some("AAPL")),
    ("ADOBE", Some("ADBE")),
    ("SALESFORCE", Some("CRM")),
    ("ORACLE", Some("ORCL")),
    ("IBM", Some("IBM")),
    ("DELL", Some("DELL")),
    ("HP", Some("HPQ")),
    ("HEWLETT PACKARD", Some("HPQ")),
    ("CISCO", Some("CSCO")),
    ("INTEL", Some("INTC")),
    ("NVIDIA", Some("NVDA")),
    ("AMD", Some("AMD")),
    ("QUALCOMM", Some("QCOM")),
    ("SAP", Some("SAP")),
    ("SERVICENOW", Some("NOW")),
    ("WORKDAY", Some("WDAY")),
    ("ZOOM", Some("ZM")),
    ("DOCUSIGN", Some("DOCU")),
    ("DROPBOX", Some("DBX")),
    ("ATLASSIAN", Some("TEAM")),
    // Telecom
    ("ATT", Some("T")),
    ("VERIZON", Some("VZ")),
    ("TMOBILE", Some("TMUS")),
    ("COMCAST", Some("CMCSA")),
    // Shipping / logistics
    ("FEDEX", Some("FDX")),
    ("UPS", Some("UPS")),
    ("DHL", Some("DPSGY")),
    // Airlines
    ("UNITED AIRLINES", Some("UAL")),
    ("AMERICAN AIRLINES", Some("AAL")),
    ("DELTA", Some("DAL")),
    ("SOUTHWEST", Some("LUV")),
    // Hotels
    ("MARRIOTT", Some("MAR")),
    ("HILTON", Some("HLT")),
    ("HYATT", Some("H")),
    // Retail
    ("HOME DEPOT", Some("HD")),
    ("LOWES", Some("LOW")),
    ("OFFICE DEPOT", Some("ODP")),
    ("BEST BUY", Some("BBY")),
    ("TARGET", Some("TGT")),
    ("WALMART", Some("WMT")),
    ("COSTCO", Some("COST")),
    // Industrial
    ("GRAINGER", Some("GWW")),
    ("FASTENAL", Some("FAST")),
    ("CATERPILLAR", Some("CAT")),
    ("JOHN DEERE", Some("DE")),
    ("3M", Some("MMM")),
    ("HONEYWELL", Some("HON")),
    ("GENERAL ELECTRIC", Some("GE")),
    ("GE", Some("GE")),
    // Food / beverage
    ("SYSCO", Some("SYY")),
    ("US FOODS", Some("USFD")),
    ("COCA COLA", Some("KO")),
    ("PEPSICO", Some("PEP")),
    ("STARBUCKS", Some("SBUX")),
    ("MCDONALDS", Some("MCD")),
    // Financial services
    ("BANK OF AMERICA", Some("BAC")),
    ("WELLS FARGO", Some("WFC")),
    ("JPMORGAN", Some("JPM")),
    ("JP MORGAN", Some("JPM")),
    ("CHASE", Some("JPM")),
    ("CITIBANK", Some("C")),
    ("CAPITAL ONE", Some("COF")),
    ("AMERICAN EXPRESS", Some("AXP")),
    ("AMEX", Some("AXP")),
    ("VISA", Some("V")),
    ("MASTERCARD", Some("MA")),
    ("PAYPAL", Some("PYPL")),
    ("STRIPE", None),
    // Insurance
    ("UNITEDHEALTH", Some("UNH")),
    ("CIGNA", Some("CI")),
    ("HUMANA", Some("HUM")),
    ("STATE FARM", None),
    ("PROGRESSIVE", Some("PGR")),
    ("ALLSTATE", Some("ALL")),
    // Payroll / HR
    ("ADP", Some("ADP")),
    ("PAYCHEX", Some("PAYX")),
    // Professional services
    ("DELOITTE", None),
    ("KPMG", None),
    ("PWC", None),
    ("ERNST YOUNG", None),
    ("ACCENTURE", Some("ACN")),
    ("MCKINSEY", None),
];

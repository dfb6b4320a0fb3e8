/// ======================= Ledger =======================
pub const KASPA_API_BASE_URL: &str = "https://api.kaspa.org";
pub const KASPA_API_URL_ENV: &str = "KASPA_API_URL";
pub const SOMPI_PER_KAS: u64 = 100_000_000;
pub const UNKNOWN_ADDRESS: &str = "(unknown)";

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const FULL_HISTORY_PAGE_SIZE: usize = 500;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const FULL_HISTORY_REQUEST_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_MAX_RETRIES: usize = 5;
pub const DEFAULT_BACKOFF_BASE: u64 = 2;
pub const DEFAULT_BACKOFF_UNIT_MS: u64 = 1_000;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 60_000;
pub const DEFAULT_INTER_PAGE_DELAY_MS: u64 = 250;
pub const DEFAULT_PREVIOUS_OUTPUT_DEPTH: u32 = 3;
pub const DEFAULT_MAX_PREVIOUS_LOOKUPS: usize = 16;

/// 2023-06-01T00:00:00Z
pub const DEFAULT_START_TIMESTAMP_MS: i64 = 1_685_577_600_000;

/// ======================= Tracer =======================
pub const GENERAL_TRACER_MAX_DEPTH: u32 = 2;
pub const FLOW_TRACER_MAX_DEPTH: u32 = 6;
pub const FULL_HISTORY_MAX_DEPTH: u32 = 0;
pub const GENERAL_DATA_DIR: &str = "flow_data_general";
pub const DEFAULT_DATA_DIR: &str = "flow_data";
pub const FULL_HISTORY_DATA_DIR: &str = "flow_data_fullhistory";
pub const CHECKPOINT_FILE_NAME: &str = "tracer_state.json";
pub const FLOW_TABLE_EXTENSION: &str = "jsonl";
pub const FULL_HISTORY_SUFFIX: &str = "_fullhistory";

/// ======================= Analysis =======================
pub const SUMMARY_ANALYSIS_MAX_DEPTH: u32 = 4;
pub const SWEEP_ANALYSIS_MAX_DEPTH: u32 = 4;
pub const SHELL_ANALYSIS_MAX_DEPTH: u32 = 6;
pub const SUMMARY_THRESHOLD: f64 = 0.85;
pub const SWEEP_THRESHOLD: f64 = 0.85;
pub const SHELL_THRESHOLD: f64 = 0.95;
pub const SWEEP_THRESHOLD_START: f64 = 0.80;
pub const SWEEP_THRESHOLD_END: f64 = 0.9999;
pub const SWEEP_THRESHOLD_STEPS: usize = 21;
pub const DEFAULT_OUTPUT_DIR: &str = "analysis_output";

/// ======================= Root wallets =======================
pub const CHAINGE_PRIMARY: &str = "kaspa:qqwvnkp47wsj6n4hkdlgj8dsauyx0xvefunnwvvsmpq2udd0ka8ckmpuqw3k5";
pub const CHAINGE_VAULT: &str = "kaspa:qq9zagcza4jt76eev9jl5z0nqhe0thcu7js8larktj4sle7lvgnw7sfcewlty";
pub const CHAINGE_2: &str = "kaspa:qpgmt2dn8wcqf0436n0kueap7yx82n7raurlj6aqjc3t3wm9y5ssqtg9e4lsm";
pub const CHAINGE_3: &str = "kaspa:qpy03sxk3z22pacz2vkn2nrqeglvptugyqy54xal2skha6xh0cr7wjueueg79";
pub const CHAINGE_4: &str = "kaspa:qz9cqmddjppjyth8rngevfs767m5nvm0480nlgs5ve8d6aegv4g9xzu2tgg0u";

pub const DEFAULT_ROOTS: [&str; 5] = [CHAINGE_PRIMARY, CHAINGE_2, CHAINGE_3, CHAINGE_4, CHAINGE_VAULT];

/// ======================= CEX wallet =======================
pub const MEXC_1: &str = "kaspa:qzrula2hgnym93zuwetfaxw7valc9j967scgcxgxg3yzkgd2nfgm26erngrfh";
pub const MEXC_2: &str = "kaspa:qpjunp39ssazf4rzfxxu0hd35xggfxn6lq0ls9u9q6peevzcmcv4xmv9q4njd";
pub const MEXC_3: &str = "kaspa:qqetp7ct8kqss99fxmymyz5t3fezppxp0t58wl6pawp27elqd46uudme00cl0";
pub const MEXC_4: &str = "kaspa:qpzpfwcsqsxhxwup26r55fd0ghqlhyugz8cp6y3wxuddc02vcxtjg75pspnwz";
pub const MEXC_5: &str = "kaspa:qz7gtc6gkgcj482s6jltww0j4n7664dhvgut5t4pn7333l7mmwah7veg0zxjq";
pub const MEXC_6: &str = "kaspa:qrayw3qwwza362uxrqxntatnz3s7pzqha7amu532p82khklugkhgj2ls49n98";
pub const MEXC_7: &str = "kaspa:qp3dpzfcjp2d7n5pslneg8wkkvp8wrw0ae60jff4a8evr6qn6g2gks0qspre3";
pub const MEXC_8: &str = "kaspa:qpr5pdq0a7cn28vnh37099yaayf7zkjz30az60atk4pdqknnnwhnxww43zgpw";
pub const MEXC_9: &str = "kaspa:qrj59crrt87qul4p7e9ywa7mz42cffjmk29p7ry7fd8vuxmla6fw5t4yscq00";

pub const GATE_IO: &str = "kaspa:qrelgny7sr3vahq69yykxx36m65gvmhryxrlwngfzgu8xkdslum2yxjp3ap8m";

pub const COINEX: &str = "kaspa:qpqpyavkqnp60q6t4sfctz4yp3n0ct963z65rxkd5ft32vkehnd3wx8jqctr2";

pub const DEFAULT_DESTINATIONS: [(&str, &str); 11] = [
    (MEXC_1, "MEXC"),
    (MEXC_2, "MEXC"),
    (MEXC_3, "MEXC"),
    (MEXC_4, "MEXC"),
    (MEXC_5, "MEXC"),
    (MEXC_6, "MEXC"),
    (MEXC_7, "MEXC"),
    (MEXC_8, "MEXC"),
    (MEXC_9, "MEXC"),
    (GATE_IO, "Gate.io"),
    (COINEX, "CoinEx"),
];

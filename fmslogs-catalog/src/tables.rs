//! Static per-log configuration: column layouts and on-disk paths.
//!
//! Tab stops are visual columns in the expanded line. Succinct cuts are
//! `(keep_end, resume_at)` byte ranges in the full expansion; the succinct
//! header strings are authored to match the post-cut column positions.

use fmslogs_engine::LogLayout;
use lazy_static::lazy_static;
use std::collections::HashMap;

static ACCESS: LogLayout = LogLayout {
    header: Some("TIMESTAMP                        LEVEL         CODE    MESSAGE"),
    stops: &[33, 47, 55],
    succinct_stops: &[33, 44, 52],
    succinct_header: Some("TIMESTAMP                  LEVEL      CODE    MESSAGE"),
    // " -0700" zone suffix of the expanded timestamp
    succinct_cuts: &[(23, 29)],
};

static EVENTS: LogLayout = LogLayout {
    header: Some(
        "TIMESTAMP                        ZONE              LEVEL         CODE    HOSTNAME                  MESSAGE",
    ),
    stops: &[33, 51, 65, 73, 99],
    succinct_stops: &[],
    succinct_header: Some(
        "TIMESTAMP                  ZONE              LEVEL         CODE    MESSAGE",
    ),
    // zone suffix, then the whole hostname column
    succinct_cuts: &[(23, 29), (73, 99)],
};

static ADMIN: LogLayout = LogLayout {
    header: Some("TIMESTAMP                   LEVEL   COMP  ADDRESS         ENDPOINT      TYPE    CODE    MESSAGE"),
    stops: &[28, 36, 42, 58, 72, 80, 88],
    succinct_stops: &[],
    succinct_header: None,
    succinct_cuts: &[],
};

static CLIENTSTATS: LogLayout = LogLayout {
    header: Some(
        "TIMESTAMP                   BYTES IN            BYTES OUT            REMOTE CALLS    IN PROGRESS                 ELAPSED         WAIT         I/O         CLIENT",
    ),
    stops: &[28, 48, 69, 85, 113, 129, 142, 154],
    succinct_stops: &[],
    succinct_header: None,
    succinct_cuts: &[],
};

static DAPI: LogLayout = LogLayout {
    header: Some("TIMESTAMP                        ERROR    LEVEL     IP_ADDRESS        USER        HTTP    MESSAGE"),
    stops: &[33, 42, 52, 70, 82, 90, 130],
    succinct_stops: &[],
    succinct_header: Some("TIMESTAMP                  ERROR    LEVEL     IP_ADDRESS        USER        HTTP    MESSAGE"),
    succinct_cuts: &[(23, 29)],
};

static ODATA: LogLayout = LogLayout {
    header: Some("TIMESTAMP                        CODE    LEVEL   ADDRESS             OP     ENDPOINT       SIZE"),
    stops: &[33, 41, 49, 69, 76, 91],
    succinct_stops: &[],
    succinct_header: Some("TIMESTAMP                  CODE    LEVEL   ADDRESS             OP     ENDPOINT       SIZE"),
    succinct_cuts: &[(23, 29)],
};

static FMSHELPER: LogLayout = LogLayout {
    header: Some("TIMESTAMP                ZONE                 MESSAGE"),
    stops: &[25, 46],
    succinct_stops: &[],
    succinct_header: None,
    succinct_cuts: &[],
};

static SCRIPTEVENT: LogLayout = LogLayout {
    header: Some("TIMESTAMP                ZONE    CODE    MESSAGE"),
    stops: &[25, 33, 41],
    succinct_stops: &[],
    succinct_header: None,
    succinct_cuts: &[],
};

static STATS: LogLayout = LogLayout {
    header: Some(
        "TIMESTAMP                ZONE    NET IN    NET OUT    DISK RD    DISK WR    CACHE%    UNSAVED%    CLIENTS    DBS    CALLS/s    ELAPSED    WAIT    I/O",
    ),
    stops: &[25, 33, 43, 54, 65, 76, 86, 98, 109, 116, 127, 138, 146, 153],
    succinct_stops: &[],
    succinct_header: None,
    succinct_cuts: &[],
};

lazy_static! {
    static ref LAYOUTS: HashMap<&'static str, &'static LogLayout> = HashMap::from([
        ("access", &ACCESS),
        ("admin", &ADMIN),
        ("fac", &ADMIN),
        ("clientstats", &CLIENTSTATS),
        ("dapi", &DAPI),
        ("events", &EVENTS),
        ("fmshelper", &FMSHELPER),
        ("odata", &ODATA),
        ("scriptevent", &SCRIPTEVENT),
        ("stats", &STATS),
    ]);

    static ref PATHS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::from([
            ("access", "Logs/Access.log"),
            ("admin", "Admin/FAC/logs/fac.log"),
            ("clientstats", "Logs/ClientStats.log"),
            ("dapi", "Logs/fmdapi.log"),
            ("events", "Logs/Event.log"),
            ("fac", "Admin/FAC/logs/fac.log"),
            ("fmsadmindebug", "Database Server/bin/fmsadminDebug.log"),
            ("fmsasedebug", "Database Server/bin/fmsaseDebug.log"),
            ("fmscwpc", "Database Server/bin/fmscwpc"),
            ("fmscwpcli", "Database Server/bin/fmscwpcli.log"),
            ("fmsdebug", "Database Server/bin/fmsDebug"),
            ("fmslogdebug", "Database Server/bin/fmslogDebug.log"),
            ("fmwipd", "Database Server/bin/fmwipd.log"),
            ("fmsgetpasskeydebug", "Database Server/bin/fmsgetpasskeyDebug.log"),
            ("fmshdebug", "Database Server/bin/fmshDebug.log"),
            ("fmshelper", "Logs/fmshelper.log"),
            ("fmodatadebug", "Database Server/bin/fmodataDebug.log"),
            ("loadschedules", "Logs/LoadSchedules.log"),
            ("install", "Logs/install.log"),
            ("odata", "Logs/fmodata.log"),
            ("scriptevent", "Logs/scriptEvent.log"),
            ("stats", "Logs/Stats.log"),
            ("topcall", "Logs/TopCallStats.log"),
            ("trimlog", "Database Server/bin/trimlog.log"),
            ("wpe", "Logs/wpe0.log"),
            ("wpedebug", "Logs/wpe_debug.log"),
        ]);
        if cfg!(target_os = "linux") {
            m.insert("stderrserverscripting", "Logs/StdErrServerScripting.log");
            m.insert("stdoutserverscripting", "Logs/StdOutServerScripting.log");
        }
        if cfg!(target_os = "macos") {
            m.insert("stderr", "Logs/stderr");
            m.insert("stdout", "Logs/stdout");
        }
        m
    };
}

/// default deployment root for this platform
pub fn default_base_path() -> &'static str {
    if cfg!(target_os = "macos") {
        "/Library/FileMaker Server"
    } else if cfg!(windows) {
        "C:/Program Files/FileMaker/FileMaker Server"
    } else {
        "/opt/FileMaker/FileMaker Server"
    }
}

pub fn relative_path(name: &str) -> Option<&'static str> {
    PATHS.get(name).copied()
}

/// every supported log name, sorted
pub fn log_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = PATHS.keys().copied().collect();
    names.sort_unstable();
    names
}

/// the column layout for a log; logs without stable columns get the plain layout
pub fn layout(name: &str) -> LogLayout {
    LAYOUTS.get(name).map(|l| **l).unwrap_or_else(LogLayout::plain)
}

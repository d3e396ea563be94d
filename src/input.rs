use serde::Deserialize;
use thiserror::Error;

/// One parsed request line.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Ping,
    Numbers,         // latest values up to the configured limit
    Average,         // mean of the latest values up to the limit
    AverageAllTime,  // mean of every value ever ingested
    Number(i64),     // window lookup by position
    Put(Vec<i64>),   // batch ingest
    Stats,
    Metrics,
    Help,
    Quit,
}

impl Request {
    /// Command name, used as a log field.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Ping           => "ping",
            Request::Numbers        => "numbers",
            Request::Average        => "average",
            Request::AverageAllTime => "average-all",
            Request::Number(_)      => "number",
            Request::Put(_)         => "put",
            Request::Stats          => "stats",
            Request::Metrics        => "metrics",
            Request::Help           => "help",
            Request::Quit           => "quit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("'{0}' is not an integer")]
    NotAnInteger(String),
    #[error("invalid JSON: {0}")]
    BadJson(String),
}

/// `put` body, shaped like the JSON accepted by the numbers endpoint.
#[derive(Debug, Deserialize)]
struct PutBody {
    numbers: Vec<i64>,
}

/// A single value as emitted by the random-number producers: `{"type":1,"number":42}`
#[derive(Debug, Deserialize)]
struct ProducerMessage {
    #[serde(rename = "type", default)]
    _kind: i64,
    number: i64,
}

pub const COMMANDS: &[(&str, &str)] = &[
    ("ping",          "heartbeat with server time"),
    ("numbers",       "most recent numbers, oldest first"),
    ("average",       "mean of the most recent numbers"),
    ("average-all",   "mean of every number ever ingested"),
    ("number <n>",    "n-th retained number, 0 = oldest"),
    ("put <v> ...",   "ingest numbers; also put {\"numbers\":[..]}"),
    ("stats",         "window and lifetime summary"),
    ("metrics",       "Prometheus counters"),
    ("help",          "this list"),
    ("quit",          "end the session"),
];

/// Parse one request line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Request>, RequestError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    if line.starts_with('{') {
        let msg: ProducerMessage = serde_json::from_str(line)
            .map_err(|e| RequestError::BadJson(e.to_string()))?;
        return Ok(Some(Request::Put(vec![msg.number])));
    }

    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((c, r)) => (c, r.trim()),
        None         => (line, ""),
    };

    let req = match cmd.to_lowercase().as_str() {
        "ping"                      => Request::Ping,
        "numbers" | "latest"        => Request::Numbers,
        "average" | "avg"           => Request::Average,
        "average-all" | "avg-all"   => Request::AverageAllTime,
        "number" | "get" => {
            if rest.is_empty() { return Err(RequestError::MissingArgument("number")); }
            Request::Number(parse_int(rest)?)
        }
        "put" => Request::Put(parse_values(rest)?),
        "stats"                     => Request::Stats,
        "metrics"                   => Request::Metrics,
        "help" | "?"                => Request::Help,
        "quit" | "exit"             => Request::Quit,
        other => return Err(RequestError::UnknownCommand(other.to_string())),
    };
    Ok(Some(req))
}

fn parse_values(rest: &str) -> Result<Vec<i64>, RequestError> {
    if rest.starts_with('{') {
        let body: PutBody = serde_json::from_str(rest)
            .map_err(|e| RequestError::BadJson(e.to_string()))?;
        return Ok(body.numbers);
    }
    rest.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(parse_int)
        .collect()
}

fn parse_int(s: &str) -> Result<i64, RequestError> {
    s.trim().parse().map_err(|_| RequestError::NotAnInteger(s.trim().to_string()))
}

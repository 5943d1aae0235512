use crate::error::RecordError;

/// Number of comma-separated fields in a position line. Extra trailing
/// fields are ignored so newer writers stay readable.
pub const FIELD_COUNT: usize = 10;

/// One instance's published position, as seen by everyone else.
///
/// Wire form is a single line:
/// `x,y,width,height,facing,state,locomotion,region,fight_target,timestamp`
/// where `fight_target` is empty when there is no proposal.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerRecord {
    /// Taken from the record key, not the line.
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: u32,
    pub height: u32,
    pub facing: i32,
    /// Animation name (`idle`, `working`, ...).
    pub state: String,
    /// Posture name (`sit`, `walk`, ...).
    pub locomotion: String,
    pub region: usize,
    pub fight_target: Option<String>,
    /// Unix seconds.
    pub timestamp: f64,
}

impl PeerRecord {
    /// Idle animation while walking: the only posture fights start from.
    pub fn is_idle_walking(&self) -> bool {
        self.state == "idle" && self.locomotion == "walk"
    }

    pub fn targets(&self, id: &str) -> bool {
        self.fight_target.as_deref() == Some(id)
    }

    pub fn encode(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{:.3}\n",
            self.x,
            self.y,
            self.width,
            self.height,
            self.facing,
            self.state,
            self.locomotion,
            self.region,
            self.fight_target.as_deref().unwrap_or(""),
            self.timestamp,
        )
    }

    /// Parse the first line of a record body.
    pub fn parse(id: &str, body: &[u8]) -> Result<Self, RecordError> {
        let text = std::str::from_utf8(body).map_err(|_| RecordError::NotUtf8)?;
        let line = text.lines().next().unwrap_or("").trim();
        let parts: Vec<&str> = line.split(',').collect();
        if line.is_empty() || parts.len() < FIELD_COUNT {
            return Err(RecordError::TooFewFields {
                found: if line.is_empty() { 0 } else { parts.len() },
                expected: FIELD_COUNT,
            });
        }

        let target = parts[8].trim();
        Ok(Self {
            id: id.to_string(),
            x: finite(parts[0], "x")?,
            y: finite(parts[1], "y")?,
            width: field(parts[2], "width")?,
            height: field(parts[3], "height")?,
            facing: field(parts[4], "facing")?,
            state: parts[5].trim().to_string(),
            locomotion: parts[6].trim().to_string(),
            region: field(parts[7], "region")?,
            fight_target: (!target.is_empty()).then(|| target.to_string()),
            timestamp: finite(parts[9], "timestamp")?,
        })
    }
}

fn field<T: std::str::FromStr>(raw: &str, name: &'static str) -> Result<T, RecordError> {
    raw.trim().parse().map_err(|_| RecordError::BadField {
        field: name,
        value: raw.to_string(),
    })
}

/// `f64` fields also reject `NaN` and the infinities.
fn finite(raw: &str, name: &'static str) -> Result<f64, RecordError> {
    match field::<f64>(raw, name)? {
        v if v.is_finite() => Ok(v),
        _ => Err(RecordError::BadField {
            field: name,
            value: raw.to_string(),
        }),
    }
}

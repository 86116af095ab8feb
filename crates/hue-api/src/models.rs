// Bridge resource records
//
// Field names follow the bridge's JSON with per-field renames (`bri` →
// `brightness`, `modelid` → `model_id`, ...). Fields the bridge documents as
// optional, or that only some device classes report, are `Option` or
// defaulted.

use serde::{Deserialize, Serialize};

use crate::codec::{BridgeError, KeyedCollection};

pub type Lights = KeyedCollection<Light>;
pub type Groups = KeyedCollection<Group>;
pub type Schedules = KeyedCollection<Schedule>;
pub type Scenes = KeyedCollection<Scene>;
pub type Sensors = KeyedCollection<Sensor>;
pub type Rules = KeyedCollection<Rule>;
pub type Whitelist = KeyedCollection<WhitelistEntry>;

// ── Lights ───────────────────────────────────────────────────────────

/// A light and its configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub state: LightState,
    pub capabilities: LightCapabilities,
    /// Unique, editable name.
    pub name: String,
    #[serde(rename = "modelid")]
    pub model_id: String,
    #[serde(rename = "manufacturername")]
    pub manufacturer_name: String,
    #[serde(rename = "productname")]
    pub product_name: String,
    #[serde(default, rename = "type")]
    pub light_type: Option<String>,
    #[serde(default, rename = "uniqueid")]
    pub unique_id: Option<String>,
    #[serde(default, rename = "swversion")]
    pub software_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    #[serde(rename = "on")]
    pub is_on: bool,
    #[serde(rename = "reachable")]
    pub is_reachable: bool,
    /// 1 (dimmest) to 254 (brightest). Absent on on/off-only devices.
    #[serde(default, rename = "bri")]
    pub brightness: Option<u8>,
    #[serde(default)]
    pub hue: Option<u16>,
    #[serde(default, rename = "sat")]
    pub saturation: Option<u8>,
    /// Mired colour temperature.
    #[serde(default, rename = "ct")]
    pub color_temperature: Option<u16>,
    #[serde(default)]
    pub xy: Option<[f32; 2]>,
    #[serde(default)]
    pub alert: Option<String>,
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(default, rename = "colormode")]
    pub color_mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightCapabilities {
    #[serde(rename = "certified")]
    pub is_certified: bool,
    pub control: LightControl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightControl {
    #[serde(default, rename = "mindimlevel")]
    pub min_dim_level: Option<u32>,
    #[serde(default, rename = "maxlumen")]
    pub max_lumen: Option<u32>,
}

// ── Groups ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    /// "LightGroup", "Room", "Luminaire", "LightSource", ...
    #[serde(rename = "type")]
    pub group_type: String,
    /// Light IDs in the group.
    pub lights: Vec<String>,
    /// Sensor IDs in the group. Older firmware omits the field.
    #[serde(default)]
    pub sensors: Vec<String>,
    pub state: GroupState,
    pub action: GroupAction,
    /// Room class, only present for rooms.
    #[serde(default)]
    pub class: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupState {
    #[serde(rename = "all_on")]
    pub is_all_on: bool,
    #[serde(rename = "any_on")]
    pub is_any_on: bool,
}

/// Light state last applied to the whole group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAction {
    #[serde(rename = "on")]
    pub is_on: bool,
    #[serde(default, rename = "bri")]
    pub brightness: Option<u8>,
    #[serde(default)]
    pub hue: Option<u16>,
    #[serde(default, rename = "sat")]
    pub saturation: Option<u8>,
    #[serde(default, rename = "ct")]
    pub color_temperature: Option<u16>,
}

// ── Config ───────────────────────────────────────────────────────────

/// Bridge configuration. All times are UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub name: String,
    /// 11, 15, 20, 25, or 0 when undefined (factory new).
    #[serde(rename = "zigbeechannel")]
    pub zigbee_channel: u8,
    #[serde(rename = "bridgeid")]
    pub bridge_id: String,
    #[serde(rename = "dhcp")]
    pub is_dhcp: bool,
    #[serde(rename = "ipaddress")]
    pub ip_address: String,
    #[serde(rename = "modelid")]
    pub model_id: String,
    /// `<major>.<minor>.<patch>`
    #[serde(rename = "apiversion")]
    pub api_version: String,
    pub whitelist: Whitelist,
    #[serde(default, rename = "swversion")]
    pub software_version: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub netmask: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default, rename = "linkbutton")]
    pub link_button: Option<bool>,
}

/// A paired application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    #[serde(rename = "last use date")]
    pub last_use_date: String,
    #[serde(rename = "create date")]
    pub create_date: String,
    pub name: String,
}

// ── Schedules ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub command: ScheduleCommand,
    /// UTC time pattern. Deprecated by the bridge in favour of `localtime`.
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default, rename = "localtime")]
    pub local_time: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    /// "enabled" or "disabled".
    pub status: String,
    #[serde(default)]
    pub recycle: bool,
    #[serde(default, rename = "autodelete")]
    pub auto_delete: Option<bool>,
}

/// Request the bridge issues when a schedule fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleCommand {
    /// Resource path, including `/api/<username>/`.
    pub address: String,
    /// "POST", "PUT" or "DELETE".
    pub method: String,
    pub body: ScheduleCommandBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleCommandBody {
    #[serde(default)]
    pub scene: Option<String>,
    #[serde(default, rename = "transitiontime")]
    pub transition_time: Option<f64>,
    #[serde(default, rename = "bri_inc")]
    pub brightness_increment: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Scenes ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub name: String,
    /// "LightScene" or "GroupScene".
    #[serde(rename = "type")]
    pub scene_type: String,
    /// Group the scene is linked to (GroupScene only).
    #[serde(default)]
    pub group: Option<String>,
    pub lights: Vec<String>,
    /// Whitelist user that last changed the scene content.
    pub owner: String,
    pub recycle: bool,
    pub locked: bool,
    /// Only reported when fetching a single scene.
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default, rename = "lastupdated")]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub version: Option<u32>,
}

// ── Sensors ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub name: String,
    #[serde(rename = "type")]
    pub sensor_type: String,
    #[serde(rename = "modelid")]
    pub model_id: String,
    #[serde(default, rename = "manufacturername")]
    pub manufacturer_name: Option<String>,
    #[serde(default, rename = "uniqueid")]
    pub unique_id: Option<String>,
    #[serde(default, rename = "swversion")]
    pub software_version: Option<String>,
    pub state: SensorState,
    pub config: SensorConfig,
}

/// Sensor readings. The populated fields depend on the sensor type;
/// anything not modelled here lands in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    #[serde(default)]
    pub flag: Option<bool>,
    #[serde(default)]
    pub presence: Option<bool>,
    /// Hundredths of a degree Celsius.
    #[serde(default)]
    pub temperature: Option<i32>,
    #[serde(default, rename = "lightlevel")]
    pub light_level: Option<u32>,
    #[serde(default, rename = "buttonevent")]
    pub button_event: Option<u32>,
    #[serde(default, rename = "lastupdated")]
    pub last_updated: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorConfig {
    #[serde(rename = "on")]
    pub is_on: bool,
    #[serde(default, rename = "configured")]
    pub is_configured: Option<bool>,
    #[serde(default, rename = "reachable")]
    pub is_reachable: Option<bool>,
    #[serde(default)]
    pub battery: Option<u8>,
}

// ── Rules ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub owner: String,
    #[serde(default)]
    pub created: Option<String>,
    /// "none" until the rule first fires.
    #[serde(default, rename = "lasttriggered")]
    pub last_triggered: Option<String>,
    #[serde(default, rename = "timestriggered")]
    pub times_triggered: u32,
    /// "enabled", "disabled" or "resourcedeleted".
    pub status: String,
    #[serde(default)]
    pub recycle: bool,
    pub conditions: Vec<RuleCondition>,
    pub actions: Vec<RuleAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCondition {
    pub address: String,
    /// "eq", "gt", "lt", "dx", "ddx", "stable", "not stable", "in", "not in".
    pub operator: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAction {
    pub address: String,
    pub method: String,
    pub body: serde_json::Map<String, serde_json::Value>,
}

// ── Modification results ─────────────────────────────────────────────

/// One entry of the bridge's acknowledgment of a state change, e.g.
/// `{"success": {"/lights/1/state/on": true}}`.
///
/// Both halves are optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModificationResult {
    #[serde(default)]
    pub success: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub error: Option<BridgeError>,
}

impl ModificationResult {
    pub fn is_success(&self) -> bool {
        self.success.is_some() && self.error.is_none()
    }
}

use serde::{Deserialize, Serialize};

/// Top-level functional category a device belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Lighting,
    Climate,
    Blinds,
    Audio,
    Video,
    Security,
    Access,
    Energy,
    Plant,
    Irrigation,
    Safety,
    Sensor,
    Infrastructure,
}

impl Domain {
    /// Every known variant, used to build the validation lookup table.
    pub const ALL: &'static [Domain] = &[
        Domain::Lighting,
        Domain::Climate,
        Domain::Blinds,
        Domain::Audio,
        Domain::Video,
        Domain::Security,
        Domain::Access,
        Domain::Energy,
        Domain::Plant,
        Domain::Irrigation,
        Domain::Safety,
        Domain::Sensor,
        Domain::Infrastructure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Lighting => "lighting",
            Domain::Climate => "climate",
            Domain::Blinds => "blinds",
            Domain::Audio => "audio",
            Domain::Video => "video",
            Domain::Security => "security",
            Domain::Access => "access",
            Domain::Energy => "energy",
            Domain::Plant => "plant",
            Domain::Irrigation => "irrigation",
            Domain::Safety => "safety",
            Domain::Sensor => "sensor",
            Domain::Infrastructure => "infrastructure",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Wire protocol used to reach a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Knx,
    Dali,
    ModbusTcp,
    ModbusRtu,
    Mqtt,
    BacnetIp,
    BacnetMstp,
    Http,
    Sip,
    Rtsp,
    Onvif,
    Ocpp,
    Rs232,
    Rs485,
}

impl Protocol {
    pub const ALL: &'static [Protocol] = &[
        Protocol::Knx,
        Protocol::Dali,
        Protocol::ModbusTcp,
        Protocol::ModbusRtu,
        Protocol::Mqtt,
        Protocol::BacnetIp,
        Protocol::BacnetMstp,
        Protocol::Http,
        Protocol::Sip,
        Protocol::Rtsp,
        Protocol::Onvif,
        Protocol::Ocpp,
        Protocol::Rs232,
        Protocol::Rs485,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Knx => "knx",
            Protocol::Dali => "dali",
            Protocol::ModbusTcp => "modbus_tcp",
            Protocol::ModbusRtu => "modbus_rtu",
            Protocol::Mqtt => "mqtt",
            Protocol::BacnetIp => "bacnet_ip",
            Protocol::BacnetMstp => "bacnet_mstp",
            Protocol::Http => "http",
            Protocol::Sip => "sip",
            Protocol::Rtsp => "rtsp",
            Protocol::Onvif => "onvif",
            Protocol::Ocpp => "ocpp",
            Protocol::Rs232 => "rs232",
            Protocol::Rs485 => "rs485",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Protocol::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Observed connectivity/health state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Online,
    Offline,
    Degraded,
    #[default]
    Unknown,
}

impl HealthStatus {
    pub const ALL: &'static [HealthStatus] = &[
        HealthStatus::Online,
        HealthStatus::Offline,
        HealthStatus::Degraded,
        HealthStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Online => "online",
            HealthStatus::Offline => "offline",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HealthStatus::ALL
            .iter()
            .copied()
            .find(|h| h.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Abstract verb/noun a device supports. Drives query-by-capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    OnOff,
    Dim,
    ColorRgb,
    ColorTemp,
    TemperatureRead,
    TemperatureSet,
    HumidityRead,
    SetpointHeat,
    SetpointCool,
    FanSpeed,
    ModeSelect,
    Position,
    Tilt,
    Stop,
    Lock,
    Unlock,
    Volume,
    Mute,
    PlaybackControl,
    InputSelect,
    PtzControl,
    RecordControl,
    MotionDetect,
    ContactSensor,
    SmokeDetect,
    GasDetect,
    WaterLeakDetect,
    OccupancyDetect,
    EnergyMeter,
    PowerMeter,
    VoltageMeter,
    FlowMeter,
    ValveControl,
    PumpControl,
    SceneTrigger,
    Diagnostics,
}

impl Capability {
    pub const ALL: &'static [Capability] = &[
        Capability::OnOff,
        Capability::Dim,
        Capability::ColorRgb,
        Capability::ColorTemp,
        Capability::TemperatureRead,
        Capability::TemperatureSet,
        Capability::HumidityRead,
        Capability::SetpointHeat,
        Capability::SetpointCool,
        Capability::FanSpeed,
        Capability::ModeSelect,
        Capability::Position,
        Capability::Tilt,
        Capability::Stop,
        Capability::Lock,
        Capability::Unlock,
        Capability::Volume,
        Capability::Mute,
        Capability::PlaybackControl,
        Capability::InputSelect,
        Capability::PtzControl,
        Capability::RecordControl,
        Capability::MotionDetect,
        Capability::ContactSensor,
        Capability::SmokeDetect,
        Capability::GasDetect,
        Capability::WaterLeakDetect,
        Capability::OccupancyDetect,
        Capability::EnergyMeter,
        Capability::PowerMeter,
        Capability::VoltageMeter,
        Capability::FlowMeter,
        Capability::ValveControl,
        Capability::PumpControl,
        Capability::SceneTrigger,
        Capability::Diagnostics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::OnOff => "on_off",
            Capability::Dim => "dim",
            Capability::ColorRgb => "color_rgb",
            Capability::ColorTemp => "color_temp",
            Capability::TemperatureRead => "temperature_read",
            Capability::TemperatureSet => "temperature_set",
            Capability::HumidityRead => "humidity_read",
            Capability::SetpointHeat => "setpoint_heat",
            Capability::SetpointCool => "setpoint_cool",
            Capability::FanSpeed => "fan_speed",
            Capability::ModeSelect => "mode_select",
            Capability::Position => "position",
            Capability::Tilt => "tilt",
            Capability::Stop => "stop",
            Capability::Lock => "lock",
            Capability::Unlock => "unlock",
            Capability::Volume => "volume",
            Capability::Mute => "mute",
            Capability::PlaybackControl => "playback_control",
            Capability::InputSelect => "input_select",
            Capability::PtzControl => "ptz_control",
            Capability::RecordControl => "record_control",
            Capability::MotionDetect => "motion_detect",
            Capability::ContactSensor => "contact_sensor",
            Capability::SmokeDetect => "smoke_detect",
            Capability::GasDetect => "gas_detect",
            Capability::WaterLeakDetect => "water_leak_detect",
            Capability::OccupancyDetect => "occupancy_detect",
            Capability::EnergyMeter => "energy_meter",
            Capability::PowerMeter => "power_meter",
            Capability::VoltageMeter => "voltage_meter",
            Capability::FlowMeter => "flow_meter",
            Capability::ValveControl => "valve_control",
            Capability::PumpControl => "pump_control",
            Capability::SceneTrigger => "scene_trigger",
            Capability::Diagnostics => "diagnostics",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Closed catalogue of device types. ~60 values grouped loosely by domain;
/// membership (not grouping) is what validation cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    // lighting
    LightSwitch,
    LightDimmer,
    LightRgb,
    LightRgbw,
    LightTunableWhite,
    LightStrip,
    // climate
    Thermostat,
    RadiatorValve,
    FanCoilUnit,
    HeatPump,
    AcUnit,
    VentilationUnit,
    HumidityController,
    // blinds
    BlindMotor,
    ShutterMotor,
    AwningMotor,
    CurtainMotor,
    // audio
    AudioAmplifier,
    AudioZonePlayer,
    AudioMatrixSwitch,
    Microphone,
    // video
    IpCamera,
    PtzCamera,
    VideoMatrixSwitch,
    DisplayPanel,
    Projector,
    // security
    DoorSensor,
    WindowSensor,
    MotionSensor,
    GlassBreakSensor,
    SecurityPanel,
    Siren,
    // access
    DoorLock,
    GateController,
    AccessReader,
    Intercom,
    // energy
    SmartMeter,
    SubMeter,
    SolarInverter,
    BatteryStorage,
    EvCharger,
    // plant
    ChillerUnit,
    BoilerUnit,
    PumpController,
    ValveActuator,
    // irrigation
    IrrigationValve,
    IrrigationController,
    SoilMoistureSensor,
    WeatherStation,
    // safety
    SmokeDetector,
    GasDetector,
    WaterLeakSensor,
    EmergencyButton,
    FireAlarmPanel,
    // sensor
    TemperatureSensor,
    HumiditySensor,
    CoSensor,
    Co2Sensor,
    LightSensor,
    OccupancySensor,
    AirQualitySensor,
    // infrastructure
    Gateway,
    NetworkSwitch,
    Ups,
    Router,
}

impl DeviceType {
    pub const ALL: &'static [DeviceType] = &[
        DeviceType::LightSwitch,
        DeviceType::LightDimmer,
        DeviceType::LightRgb,
        DeviceType::LightRgbw,
        DeviceType::LightTunableWhite,
        DeviceType::LightStrip,
        DeviceType::Thermostat,
        DeviceType::RadiatorValve,
        DeviceType::FanCoilUnit,
        DeviceType::HeatPump,
        DeviceType::AcUnit,
        DeviceType::VentilationUnit,
        DeviceType::HumidityController,
        DeviceType::BlindMotor,
        DeviceType::ShutterMotor,
        DeviceType::AwningMotor,
        DeviceType::CurtainMotor,
        DeviceType::AudioAmplifier,
        DeviceType::AudioZonePlayer,
        DeviceType::AudioMatrixSwitch,
        DeviceType::Microphone,
        DeviceType::IpCamera,
        DeviceType::PtzCamera,
        DeviceType::VideoMatrixSwitch,
        DeviceType::DisplayPanel,
        DeviceType::Projector,
        DeviceType::DoorSensor,
        DeviceType::WindowSensor,
        DeviceType::MotionSensor,
        DeviceType::GlassBreakSensor,
        DeviceType::SecurityPanel,
        DeviceType::Siren,
        DeviceType::DoorLock,
        DeviceType::GateController,
        DeviceType::AccessReader,
        DeviceType::Intercom,
        DeviceType::SmartMeter,
        DeviceType::SubMeter,
        DeviceType::SolarInverter,
        DeviceType::BatteryStorage,
        DeviceType::EvCharger,
        DeviceType::ChillerUnit,
        DeviceType::BoilerUnit,
        DeviceType::PumpController,
        DeviceType::ValveActuator,
        DeviceType::IrrigationValve,
        DeviceType::IrrigationController,
        DeviceType::SoilMoistureSensor,
        DeviceType::WeatherStation,
        DeviceType::SmokeDetector,
        DeviceType::GasDetector,
        DeviceType::WaterLeakSensor,
        DeviceType::EmergencyButton,
        DeviceType::FireAlarmPanel,
        DeviceType::TemperatureSensor,
        DeviceType::HumiditySensor,
        DeviceType::CoSensor,
        DeviceType::Co2Sensor,
        DeviceType::LightSensor,
        DeviceType::OccupancySensor,
        DeviceType::AirQualitySensor,
        DeviceType::Gateway,
        DeviceType::NetworkSwitch,
        DeviceType::Ups,
        DeviceType::Router,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::LightSwitch => "light_switch",
            DeviceType::LightDimmer => "light_dimmer",
            DeviceType::LightRgb => "light_rgb",
            DeviceType::LightRgbw => "light_rgbw",
            DeviceType::LightTunableWhite => "light_tunable_white",
            DeviceType::LightStrip => "light_strip",
            DeviceType::Thermostat => "thermostat",
            DeviceType::RadiatorValve => "radiator_valve",
            DeviceType::FanCoilUnit => "fan_coil_unit",
            DeviceType::HeatPump => "heat_pump",
            DeviceType::AcUnit => "ac_unit",
            DeviceType::VentilationUnit => "ventilation_unit",
            DeviceType::HumidityController => "humidity_controller",
            DeviceType::BlindMotor => "blind_motor",
            DeviceType::ShutterMotor => "shutter_motor",
            DeviceType::AwningMotor => "awning_motor",
            DeviceType::CurtainMotor => "curtain_motor",
            DeviceType::AudioAmplifier => "audio_amplifier",
            DeviceType::AudioZonePlayer => "audio_zone_player",
            DeviceType::AudioMatrixSwitch => "audio_matrix_switch",
            DeviceType::Microphone => "microphone",
            DeviceType::IpCamera => "ip_camera",
            DeviceType::PtzCamera => "ptz_camera",
            DeviceType::VideoMatrixSwitch => "video_matrix_switch",
            DeviceType::DisplayPanel => "display_panel",
            DeviceType::Projector => "projector",
            DeviceType::DoorSensor => "door_sensor",
            DeviceType::WindowSensor => "window_sensor",
            DeviceType::MotionSensor => "motion_sensor",
            DeviceType::GlassBreakSensor => "glass_break_sensor",
            DeviceType::SecurityPanel => "security_panel",
            DeviceType::Siren => "siren",
            DeviceType::DoorLock => "door_lock",
            DeviceType::GateController => "gate_controller",
            DeviceType::AccessReader => "access_reader",
            DeviceType::Intercom => "intercom",
            DeviceType::SmartMeter => "smart_meter",
            DeviceType::SubMeter => "sub_meter",
            DeviceType::SolarInverter => "solar_inverter",
            DeviceType::BatteryStorage => "battery_storage",
            DeviceType::EvCharger => "ev_charger",
            DeviceType::ChillerUnit => "chiller_unit",
            DeviceType::BoilerUnit => "boiler_unit",
            DeviceType::PumpController => "pump_controller",
            DeviceType::ValveActuator => "valve_actuator",
            DeviceType::IrrigationValve => "irrigation_valve",
            DeviceType::IrrigationController => "irrigation_controller",
            DeviceType::SoilMoistureSensor => "soil_moisture_sensor",
            DeviceType::WeatherStation => "weather_station",
            DeviceType::SmokeDetector => "smoke_detector",
            DeviceType::GasDetector => "gas_detector",
            DeviceType::WaterLeakSensor => "water_leak_sensor",
            DeviceType::EmergencyButton => "emergency_button",
            DeviceType::FireAlarmPanel => "fire_alarm_panel",
            DeviceType::TemperatureSensor => "temperature_sensor",
            DeviceType::HumiditySensor => "humidity_sensor",
            DeviceType::CoSensor => "co_sensor",
            DeviceType::Co2Sensor => "co2_sensor",
            DeviceType::LightSensor => "light_sensor",
            DeviceType::OccupancySensor => "occupancy_sensor",
            DeviceType::AirQualitySensor => "air_quality_sensor",
            DeviceType::Gateway => "gateway",
            DeviceType::NetworkSwitch => "network_switch",
            DeviceType::Ups => "ups",
            DeviceType::Router => "router",
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn domain_round_trips_through_display_and_from_str() {
        for d in Domain::ALL {
            assert_eq!(Domain::from_str(&d.to_string()).unwrap(), *d);
        }
    }

    #[test]
    fn protocol_round_trips_through_display_and_from_str() {
        for p in Protocol::ALL {
            assert_eq!(Protocol::from_str(&p.to_string()).unwrap(), *p);
        }
    }

    #[test]
    fn capability_round_trips_through_display_and_from_str() {
        for c in Capability::ALL {
            assert_eq!(Capability::from_str(&c.to_string()).unwrap(), *c);
        }
    }

    #[test]
    fn device_type_round_trips_through_display_and_from_str() {
        for t in DeviceType::ALL {
            assert_eq!(DeviceType::from_str(&t.to_string()).unwrap(), *t);
        }
    }

    #[test]
    fn health_status_defaults_to_unknown() {
        assert_eq!(HealthStatus::default(), HealthStatus::Unknown);
    }

    #[test]
    fn unknown_token_is_rejected() {
        assert!(Domain::from_str("not-a-domain").is_err());
        assert!(Protocol::from_str("not-a-protocol").is_err());
    }
}

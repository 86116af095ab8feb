// Resource operations
//
// One module per bridge collection, each adding inherent methods to
// `HueClient`. List operations decode keyed collections; get operations
// decode a single record.

mod config;
mod groups;
mod lights;
mod rules;
mod scenes;
mod schedules;
mod sensors;

mod database;
mod gates;
mod helper;
mod home;
mod validation;

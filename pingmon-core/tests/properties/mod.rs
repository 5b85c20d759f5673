mod settings_tests;
mod validation_tests;

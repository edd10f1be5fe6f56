pub(crate) mod callback_controller;
pub(crate) mod dashboard_controller;
pub(crate) mod landing_controller;
pub(crate) mod session_controller;

pub mod cat;
pub mod config;
pub mod error;
pub mod metrics;
pub mod net;
pub mod optim;
pub mod reshape;

pub use cat::{CatInfo, OneHotGroup, cat_normalize, warn_if_unconfigured};
pub use config::{Config, ConfigCls, Configs, get_config, load_json, validate_configs};
pub use error::{CfxError, Result};
pub use metrics::{accuracy, binary_cross_entropy, dist, proximity, sigmoid};
pub use net::{Mlp, MlpConfig, Module, Transformed, make_model, make_module};
pub use optim::{
    Adam, GradientDescent, GradientDescentWithMomentum, GradientTransformation, grad_update,
    init_net_opt,
};
pub use reshape::single_instance;

#![allow(dead_code)]

use remote_model::framework::mock::MockConnection;
use remote_model::{remote_associations, Attributes, Model, ModelType, Record, ResourceClient, SiteConfig};
use serde_json::Value;
use std::sync::LazyLock;

pub const SITE: &str = "http://api.test";

macro_rules! define_model {
    ($ty:ident, $name:literal, $model_type:ident = $init:expr) => {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $ty(Record);

        static $model_type: LazyLock<ModelType> = LazyLock::new(|| $init);

        impl Model for $ty {
            const NAME: &'static str = $name;

            fn model_type() -> &'static ModelType {
                &$model_type
            }

            fn from_record(record: Record) -> Self {
                Self(record)
            }

            fn record(&self) -> &Record {
                &self.0
            }

            fn record_mut(&mut self) -> &mut Record {
                &mut self.0
            }

            fn into_record(self) -> Record {
                self.0
            }
        }
    };
}

define_model!(Wheel, "wheel", WHEEL = ModelType::new(Wheel::NAME));
define_model!(Engine, "engine", ENGINE = ModelType::new(Engine::NAME));
define_model!(Brand, "brand", BRAND = ModelType::new(Brand::NAME));
define_model!(Dealer, "dealer", DEALER = ModelType::new(Dealer::NAME));
define_model!(Owner, "owner", OWNER = ModelType::new(Owner::NAME).with_uri("/people"));
define_model!(Spoiler, "spoiler", SPOILER = ModelType::new(Spoiler::NAME));

define_model!(
    Car,
    "car",
    CAR = ModelType::new(Car::NAME)
        .with_savable(["name", "color"])
        .declare_all(Car::association_descriptors())
        .expect("valid car associations")
);

remote_associations! {
    impl Car {
        has_many wheels: Wheel;
        has_one engine: Engine;
        belongs_to brand: Brand;
        belongs_to maker: Brand { path: "/makers/:maker_id" };
        has_many dealers: Dealer { path: "/regions/:region/dealers" };
    }
}

define_model!(
    SportsCar,
    "SportsCar",
    SPORTS_CAR = ModelType::inherit(&CAR, SportsCar::NAME)
        .declare_all(SportsCar::association_descriptors())
        .expect("valid sports car associations")
);

remote_associations! {
    impl SportsCar: Car {
        has_one spoiler: Spoiler;
    }
}

pub fn attrs(value: Value) -> Attributes {
    value.as_object().cloned().expect("object literal")
}

pub fn client(mock: &MockConnection) -> ResourceClient {
    ResourceClient::new(SiteConfig::new(SITE), mock.clone())
}

pub fn car(value: Value) -> Car {
    Car::build(attrs(value))
}

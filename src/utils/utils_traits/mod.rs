use serde::de::DeserializeOwned;
use serde::{Serialize};
use crate::utils::utils_errors::OptimaError;

pub trait SaveAndLoadable {
    type SaveType: Serialize + DeserializeOwned;

    fn get_save_serialization_object(&self) -> Self::SaveType;
    fn get_serialization_string(&self) -> Result<String, OptimaError> {
        serde_json::to_string(&self.get_save_serialization_object()).map_err(|e| OptimaError::new_generic_error_str(&e.to_string(), file!(), line!()))
    }
    fn load_from_json_string(json_str: &str) -> Result<Self, OptimaError> where Self: Sized;
}

pub fn load_object_from_json_string<T: DeserializeOwned>(json_str: &str) -> Result<T, OptimaError> {
    let load: Result<T, _> = serde_json::from_str(json_str);
    return match load {
        Ok(t) => { Ok(t) }
        Err(e) => { Err(OptimaError::new_parameter_load_error("json", &e.to_string(), file!(), line!())) }
    }
}

pub trait ToAndFromRonString: Serialize + DeserializeOwned {
    fn convert_to_ron_string(&self) -> Result<String, OptimaError> {
        ron::to_string(self).map_err(|e| OptimaError::new_generic_error_str(&e.to_string(), file!(), line!()))
    }
    fn load_from_ron_string(ron_string: &str) -> Result<Self, OptimaError> where Self: Sized {
        let load: Result<Self, _> = ron::from_str(ron_string);
        return match load {
            Ok(load) => { Ok(load) }
            Err(e) => { Err(OptimaError::new_parameter_load_error("ron", &e.to_string(), file!(), line!())) }
        }
    }
}
impl <T> ToAndFromRonString for T where T: Serialize + DeserializeOwned {  }

pub trait ToAndFromTomlString: Serialize + DeserializeOwned {
    fn convert_to_toml_string(&self) -> Result<String, OptimaError> {
        toml::to_string(self).map_err(|e| OptimaError::new_generic_error_str(&e.to_string(), file!(), line!()))
    }
    fn load_from_toml_string(toml_string: &str) -> Result<Self, OptimaError> where Self: Sized {
        let load: Result<Self, _> = toml::from_str(toml_string);
        return match load {
            Ok(load) => { Ok(load) }
            Err(e) => { Err(OptimaError::new_parameter_load_error("toml", &e.to_string(), file!(), line!())) }
        }
    }
}
impl <T> ToAndFromTomlString for T where T: Serialize + DeserializeOwned {  }

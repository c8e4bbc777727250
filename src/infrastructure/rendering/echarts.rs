//! ECharts adapter. The library is looked up on the global object and driven
//! through `Reflect`; the option object comes straight from serde.

use gloo::utils::format::JsValueSerdeExt;
use js_sys::{Function, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::application::chart_session::ChartSurface;
use crate::domain::chart::{ChartSpecification, ColorRule};
use crate::domain::errors::AppError;
use crate::domain::logging::{LogComponent, get_logger};

type ColorCallback = Closure<dyn Fn(JsValue) -> JsValue>;

/// Live chart instance plus the per-point color callbacks it calls into.
/// The callbacks must outlive the instance, so they are dropped together.
pub struct EChartsHandle {
    instance: JsValue,
    _color_callbacks: Vec<ColorCallback>,
}

pub struct EChartsSurface {
    container_id: String,
}

impl EChartsSurface {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
        }
    }

    fn container(&self) -> Result<web_sys::Element, AppError> {
        web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(&self.container_id))
            .ok_or_else(|| {
                AppError::Rendering(format!("container #{} not found", self.container_id))
            })
    }
}

impl ChartSurface for EChartsSurface {
    type Handle = EChartsHandle;

    fn mount(&self, spec: &ChartSpecification) -> Result<EChartsHandle, AppError> {
        let container = self.container()?;
        container
            .set_attribute(
                "style",
                &format!("width: 100%; height: {}px;", spec.container_height),
            )
            .map_err(js_error)?;

        let echarts = Reflect::get(&js_sys::global(), &JsValue::from_str("echarts"))
            .map_err(js_error)?;
        if echarts.is_undefined() {
            return Err(AppError::Rendering("echarts is not loaded".to_string()));
        }
        let instance = method(&echarts, "init")?
            .call1(&echarts, &container)
            .map_err(js_error)?;

        let option = JsValue::from_serde(spec)
            .map_err(|e| AppError::Rendering(format!("option serialization: {e}")))?;
        let callbacks = match install_color_rules(&option, spec) {
            Ok(callbacks) => callbacks,
            Err(e) => {
                dispose_instance(&instance);
                return Err(e);
            }
        };

        let applied = method(&instance, "setOption")
            .and_then(|set_option| {
                set_option
                    .call2(&instance, &option, &JsValue::TRUE)
                    .map_err(js_error)
            });
        if let Err(e) = applied {
            dispose_instance(&instance);
            return Err(e);
        }

        get_logger().debug(
            LogComponent::Infrastructure("ECharts"),
            &format!(
                "mounted {} series, {} color rules, {}px",
                spec.series.len(),
                callbacks.len(),
                spec.container_height
            ),
        );
        Ok(EChartsHandle {
            instance,
            _color_callbacks: callbacks,
        })
    }

    fn dispose(&self, handle: EChartsHandle) {
        dispose_instance(&handle.instance);
    }
}

/// Replaces `series[i].itemStyle.color` with a callback for every series
/// that carries a [`ColorRule`].
fn install_color_rules(
    option: &JsValue,
    spec: &ChartSpecification,
) -> Result<Vec<ColorCallback>, AppError> {
    let series_list = Reflect::get(option, &JsValue::from_str("series")).map_err(js_error)?;
    let mut callbacks = Vec::new();
    for (index, series) in spec.series.iter().enumerate() {
        let Some(rule) = &series.color_rule else {
            continue;
        };
        let target = Reflect::get(&series_list, &JsValue::from(index as u32)).map_err(js_error)?;
        let mut style = Reflect::get(&target, &JsValue::from_str("itemStyle")).map_err(js_error)?;
        if !style.is_object() {
            style = Object::new().into();
            Reflect::set(&target, &JsValue::from_str("itemStyle"), &style).map_err(js_error)?;
        }
        let callback = color_callback(rule.clone());
        Reflect::set(&style, &JsValue::from_str("color"), callback.as_ref()).map_err(js_error)?;
        callbacks.push(callback);
    }
    Ok(callbacks)
}

fn color_callback(rule: ColorRule) -> ColorCallback {
    Closure::wrap(Box::new(move |params: JsValue| -> JsValue {
        let index = Reflect::get(&params, &JsValue::from_str("dataIndex"))
            .ok()
            .and_then(|value| value.as_f64())
            .map(|value| value as usize);
        let value = Reflect::get(&params, &JsValue::from_str("value"))
            .ok()
            .and_then(|value| value.as_f64());
        let color = match index {
            Some(index) => rule.resolve(index, value),
            None => rule.fallback(),
        };
        JsValue::from_str(color.as_str())
    }) as Box<dyn Fn(JsValue) -> JsValue>)
}

fn method(target: &JsValue, name: &str) -> Result<Function, AppError> {
    Reflect::get(target, &JsValue::from_str(name))
        .map_err(js_error)?
        .dyn_into::<Function>()
        .map_err(|_| AppError::Rendering(format!("{name} is not a function")))
}

fn dispose_instance(instance: &JsValue) {
    let disposed = method(instance, "dispose")
        .and_then(|dispose| dispose.call0(instance).map_err(js_error));
    if let Err(e) = disposed {
        get_logger().warn(
            LogComponent::Infrastructure("ECharts"),
            &format!("dispose failed: {e}"),
        );
    }
}

fn js_error(error: JsValue) -> AppError {
    AppError::Rendering(format!("{error:?}"))
}

//! `GridView` - the JavaScript entry point.
//!
//! Wires a canvas to a [`DataGrid`]: DOM pointer and wheel events are
//! routed into the grid, and an animation-frame loop redraws every frame.
//!
//! ```javascript
//! import init, { GridView } from 'gridview';
//! await init();
//! const view = new GridView(canvas, window.devicePixelRatio);
//! view.setColumns([{ title: "Person", children: [{ id: "name", title: "Name" }] }]);
//! view.setRows([{ name: "Ada" }]);
//! view.onOrderChange(order => localStorage.setItem("order", JSON.stringify(order)));
//! view.start();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Function;
use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, WheelEvent};

use crate::grid::DataGrid;
use crate::render::Canvas2dSurface;
use crate::scene::{EventKind, Modifiers, PointerEvent};
use crate::signal::Subscription;
use crate::types::{ColumnDef, GridConfig};

struct SharedState {
    grid: DataGrid,
    surface: Canvas2dSurface,
    /// Orders produced while the state was borrowed, delivered afterwards.
    pending_orders: Rc<RefCell<Vec<Vec<String>>>>,
    order_callback: Option<Function>,
}

impl SharedState {
    fn render(&mut self) -> crate::error::Result<()> {
        self.surface.begin_frame();
        self.grid.render(&mut self.surface)
    }
}

type MouseClosure = Closure<dyn FnMut(MouseEvent)>;

#[wasm_bindgen]
pub struct GridView {
    state: Rc<RefCell<SharedState>>,
    #[allow(dead_code)]
    closures: Vec<MouseClosure>,
    #[allow(dead_code)]
    wheel_closure: Closure<dyn FnMut(WheelEvent)>,
    #[allow(dead_code)]
    order_subscription: Subscription,
    frame: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
    frame_handle: Rc<Cell<Option<i32>>>,
}

fn modifiers(event: &MouseEvent) -> Modifiers {
    Modifiers {
        shift: event.shift_key(),
        ctrl: event.ctrl_key(),
        alt: event.alt_key(),
        meta: event.meta_key(),
    }
}

#[allow(clippy::cast_precision_loss)]
fn pointer_event(kind: EventKind, event: &MouseEvent) -> PointerEvent {
    PointerEvent::new(kind, event.offset_x() as f32, event.offset_y() as f32)
        .with_modifiers(modifiers(event))
}

/// Hand queued order changes to the JS callback once the state is released.
fn flush_orders(state: &Rc<RefCell<SharedState>>) {
    let (orders, callback) = {
        let s = state.borrow();
        let orders = std::mem::take(&mut *s.pending_orders.borrow_mut());
        (orders, s.order_callback.clone())
    };
    let Some(callback) = callback else {
        return;
    };
    for order in orders {
        match serde_wasm_bindgen::to_value(&order) {
            Ok(value) => {
                if let Err(err) = callback.call1(&JsValue::NULL, &value) {
                    tracing::warn!(?err, "order change callback threw");
                }
            }
            Err(err) => tracing::warn!(%err, "could not serialize column order"),
        }
    }
}

fn request_frame(callback: &Closure<dyn FnMut()>) -> Option<i32> {
    web_sys::window()?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .ok()
}

#[wasm_bindgen]
impl GridView {
    /// Attach to `canvas`, sized from its current backing store.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, dpr: f32) -> Result<GridView, JsValue> {
        console_error_panic_hook::set_once();

        let surface = Canvas2dSurface::new(canvas.clone(), dpr);
        let grid = DataGrid::new(GridConfig::default())?;
        let pending_orders: Rc<RefCell<Vec<Vec<String>>>> = Rc::default();
        let queue = Rc::clone(&pending_orders);
        let order_subscription = grid.on_order_change(move |change| {
            queue.borrow_mut().push(change.order.clone());
        });

        let state = Rc::new(RefCell::new(SharedState {
            grid,
            surface,
            pending_orders,
            order_callback: None,
        }));

        let mut closures: Vec<MouseClosure> = Vec::new();
        let routes = [
            ("mousedown", EventKind::MouseDown),
            ("mousemove", EventKind::MouseMove),
            ("mouseup", EventKind::MouseUp),
            ("click", EventKind::Click),
            ("dblclick", EventKind::DoubleClick),
        ];
        for (name, kind) in routes {
            let state = Rc::clone(&state);
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                let result = state.borrow_mut().grid.pointer(pointer_event(kind, &event));
                if let Err(err) = result {
                    tracing::warn!(%err, event = name, "pointer handling failed");
                }
                flush_orders(&state);
            }) as Box<dyn FnMut(MouseEvent)>);
            canvas
                .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
                .ok();
            closures.push(closure);
        }

        {
            let state = Rc::clone(&state);
            let closure = Closure::wrap(Box::new(move |_event: MouseEvent| {
                state.borrow_mut().grid.pointer_leave();
            }) as Box<dyn FnMut(MouseEvent)>);
            canvas
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref())
                .ok();
            closures.push(closure);
        }

        let wheel_closure = {
            let state = Rc::clone(&state);
            let closure = Closure::wrap(Box::new(move |event: WheelEvent| {
                event.prevent_default();
                #[allow(clippy::cast_possible_truncation)]
                let (dx, dy) = (event.delta_x() as f32, event.delta_y() as f32);
                state.borrow_mut().grid.scroll_by(dx, dy);
            }) as Box<dyn FnMut(WheelEvent)>);
            canvas
                .add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref())
                .ok();
            closure
        };

        Ok(GridView {
            state,
            closures,
            wheel_closure,
            order_subscription,
            frame: Rc::new(RefCell::new(None)),
            frame_handle: Rc::new(Cell::new(None)),
        })
    }

    /// Apply a (partial) `GridConfig` object.
    #[wasm_bindgen(js_name = "setConfig")]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: GridConfig = serde_wasm_bindgen::from_value(config)?;
        self.state.borrow_mut().grid.set_config(config)?;
        Ok(())
    }

    /// Replace the column-definition tree.
    #[wasm_bindgen(js_name = "setColumns")]
    pub fn set_columns(&mut self, columns: JsValue) -> Result<(), JsValue> {
        let defs: Vec<ColumnDef> = serde_wasm_bindgen::from_value(columns)?;
        tracing::debug!(count = defs.len(), "columns set");
        self.state.borrow_mut().grid.set_columns(defs);
        Ok(())
    }

    #[wasm_bindgen(js_name = "setRows")]
    pub fn set_rows(&mut self, rows: JsValue) -> Result<(), JsValue> {
        let rows: Vec<Value> = serde_wasm_bindgen::from_value(rows)?;
        self.state.borrow_mut().grid.set_rows(rows);
        Ok(())
    }

    /// Field holding each row's child rows, or `undefined` for a flat grid.
    #[wasm_bindgen(js_name = "setChildrenKey")]
    pub fn set_children_key(&mut self, key: Option<String>) {
        self.state.borrow_mut().grid.set_children_key(key);
    }

    #[wasm_bindgen(js_name = "setColumnOrder")]
    pub fn set_column_order(&mut self, ids: Vec<String>) {
        self.state.borrow_mut().grid.set_column_order(ids);
        flush_orders(&self.state);
    }

    #[wasm_bindgen(js_name = "columnOrder")]
    pub fn column_order(&self) -> Vec<String> {
        self.state.borrow_mut().grid.column_ids()
    }

    #[wasm_bindgen(js_name = "setColumnWidth")]
    pub fn set_column_width(&mut self, id: &str, width: f32) {
        self.state.borrow_mut().grid.set_column_width(id, width);
    }

    /// Called with the new id array whenever the column order changes.
    #[wasm_bindgen(js_name = "onOrderChange")]
    pub fn on_order_change(&mut self, callback: Option<Function>) {
        self.state.borrow_mut().order_callback = callback;
    }

    /// The composed header as `{ levelCount, cells }`.
    #[wasm_bindgen(js_name = "headerLayout")]
    pub fn header_layout(&self) -> Result<JsValue, JsValue> {
        let layout = self.state.borrow_mut().grid.header_layout();
        Ok(serde_wasm_bindgen::to_value(&*layout)?)
    }

    /// Resize to `width x height` CSS pixels.
    pub fn resize(&mut self, width: f32, height: f32, dpr: f32) {
        let mut s = self.state.borrow_mut();
        s.surface.resize(width, height, dpr);
        s.grid.resize(width, height);
    }

    #[wasm_bindgen(js_name = "scrollTo")]
    pub fn scroll_to(&mut self, x: f32, y: f32) {
        self.state.borrow_mut().grid.scroll_to(x, y);
    }

    #[wasm_bindgen(js_name = "scrollBy")]
    pub fn scroll_by(&mut self, dx: f32, dy: f32) {
        self.state.borrow_mut().grid.scroll_by(dx, dy);
    }

    /// Draw one frame now.
    pub fn render(&mut self) -> Result<(), JsValue> {
        self.state.borrow_mut().render()?;
        Ok(())
    }

    /// Redraw on every animation frame until [`stop`](Self::stop).
    pub fn start(&mut self) {
        if self.frame.borrow().is_some() {
            return;
        }
        let state = Rc::clone(&self.state);
        let frame = Rc::clone(&self.frame);
        let handle = Rc::clone(&self.frame_handle);
        let closure = Closure::wrap(Box::new(move || {
            if let Err(err) = state.borrow_mut().render() {
                tracing::warn!(%err, "frame failed");
            }
            if let Some(next) = frame.borrow().as_ref() {
                handle.set(request_frame(next));
            }
        }) as Box<dyn FnMut()>);
        self.frame_handle.set(request_frame(&closure));
        *self.frame.borrow_mut() = Some(closure);
    }

    pub fn stop(&mut self) {
        if let (Some(id), Some(window)) = (self.frame_handle.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        self.frame.borrow_mut().take();
    }

    #[wasm_bindgen(js_name = "setDebugBounds")]
    pub fn set_debug_bounds(&mut self, enabled: bool) -> Result<(), JsValue> {
        let mut s = self.state.borrow_mut();
        let mut config = s.grid.config().clone();
        config.debug_bounds = enabled;
        s.grid.set_config(config)?;
        Ok(())
    }
}

impl Drop for GridView {
    fn drop(&mut self) {
        self.stop();
    }
}

//! Menus and the menu bar.
//!
//! Menu items name the action they trigger with its scoped name:
//! `app.<name>` for application commands and `win.<name>` for commands of
//! the front window. Activating a native menu item runs
//! [`Application::activate_action`].
//!
//! Menu bars can be built in code or from XML with [`MenuResource`]:
//!
//! ```xml
//! <menubar id="main">
//!   <menu id="file" label="File">
//!     <item label="New" action="app.new" accel="Ctrl+N"/>
//!     <separator/>
//!     <item label="Quit" action="app.quit" accel="Ctrl+Q"/>
//!   </menu>
//! </menubar>
//! ```

use std::fmt;
use std::rc::{Rc, Weak};

use mgui_core::logging::targets;

use crate::application::Application;
use crate::error::{ResourceError, Result};
use crate::keys::Accelerator;
use crate::native::{NativeWidget, Slot};
use crate::resource::{ResourceEvent, ResourceReader};

/// The platform side of a menu.
pub trait MenuImpl {
    /// The native menu object.
    fn native(&self) -> &NativeWidget;

    /// Append an item and return its native object. The object emits
    /// `activate()` when the user picks the item.
    fn append_item(&self, item: &MenuItem) -> Result<NativeWidget>;

    fn append_separator(&self);

    fn append_submenu(&self, label: &str, submenu: &dyn MenuImpl);
}

/// One actionable menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    /// Scoped action name, e.g. `app.quit`.
    pub action: String,
    /// Shown next to the label.
    pub accelerator: Option<Accelerator>,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
            accelerator: None,
        }
    }

    pub fn with_accelerator(mut self, accelerator: Option<Accelerator>) -> Self {
        self.accelerator = accelerator;
        self
    }
}

/// Routes a native item activation to the application.
struct ItemBinding {
    action: String,
    app: Weak<Application>,
    slot: Slot<ItemBinding, (), Result<()>>,
}

impl ItemBinding {
    fn on_activate(&self, _: ()) -> Result<()> {
        match self.app.upgrade() {
            Some(app) => Ok(app.activate_action(&self.action)?),
            None => Ok(()),
        }
    }
}

/// An entry of a [`Menu`].
#[derive(Debug)]
pub enum MenuEntry {
    Item(MenuItem),
    Separator,
    Submenu(Menu),
}

/// A menu.
pub struct Menu {
    id: Option<String>,
    label: String,
    app: Weak<Application>,
    imp: Box<dyn MenuImpl>,
    entries: Vec<MenuEntry>,
    bindings: Vec<Rc<ItemBinding>>,
}

impl Menu {
    /// Create an empty menu.
    pub fn new(app: &Rc<Application>, label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        let imp = app.backend().create_menu(&label)?;
        Ok(Self {
            id: None,
            label,
            app: Rc::downgrade(app),
            imp,
            entries: Vec::new(),
            bindings: Vec::new(),
        })
    }

    /// Give the menu an id for [`MenuBar::find_menu`].
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn native(&self) -> &NativeWidget {
        self.imp.native()
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Append an item that activates `item.action`.
    pub fn append_item(&mut self, item: MenuItem) -> Result<()> {
        let native = self.imp.append_item(&item)?;
        let app = self.app.clone();
        let action = item.action.clone();
        let binding = Rc::new_cyclic(|weak: &Weak<ItemBinding>| ItemBinding {
            action,
            app,
            slot: Slot::new(weak.clone(), ItemBinding::on_activate),
        });
        native.connect(&binding.slot, "activate")?;
        tracing::trace!(target: targets::RESOURCE, menu = %self.label, action = %item.action, "menu item added");
        self.bindings.push(binding);
        self.entries.push(MenuEntry::Item(item));
        Ok(())
    }

    pub fn append_separator(&mut self) {
        self.imp.append_separator();
        self.entries.push(MenuEntry::Separator);
    }

    pub fn append_submenu(&mut self, submenu: Menu) {
        self.imp.append_submenu(&submenu.label, submenu.imp.as_ref());
        self.entries.push(MenuEntry::Submenu(submenu));
    }

    /// This menu or the first submenu (depth first) with `id`.
    pub fn find_menu(&self, id: &str) -> Option<&Menu> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.entries.iter().find_map(|entry| match entry {
            MenuEntry::Submenu(menu) => menu.find_menu(id),
            _ => None,
        })
    }

    /// The first item (depth first) bound to `action`.
    pub fn find_item(&self, action: &str) -> Option<&MenuItem> {
        self.entries.iter().find_map(|entry| match entry {
            MenuEntry::Item(item) if item.action == action => Some(item),
            MenuEntry::Submenu(menu) => menu.find_item(action),
            _ => None,
        })
    }
}

impl fmt::Debug for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Menu")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("entries", &self.entries)
            .finish()
    }
}

/// The application's top-level menus.
#[derive(Debug, Default)]
pub struct MenuBar {
    id: Option<String>,
    menus: Vec<Menu>,
}

impl MenuBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn append(&mut self, menu: Menu) {
        self.menus.push(menu);
    }

    pub fn menus(&self) -> &[Menu] {
        &self.menus
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    /// The first menu (depth first) with `id`.
    pub fn find_menu(&self, id: &str) -> Option<&Menu> {
        self.menus.iter().find_map(|menu| menu.find_menu(id))
    }

    /// The first item (depth first) bound to `action`.
    pub fn find_item(&self, action: &str) -> Option<&MenuItem> {
        self.menus.iter().find_map(|menu| menu.find_item(action))
    }
}

// ============================================================================
// XML
// ============================================================================

/// Builds menu bars from XML.
pub struct MenuResource;

impl MenuResource {
    /// Parse `xml` and build a menu bar against `app`'s backend.
    ///
    /// `<menubar>` may carry an `id`. `<menu>` needs a `label`; `<item>`
    /// needs a `label` and an `action` and may carry an `accel`.
    pub fn from_xml(app: &Rc<Application>, xml: &str) -> Result<MenuBar> {
        let mut reader = ResourceReader::new(xml);
        let mut bar: Option<MenuBar> = None;
        let mut stack: Vec<Menu> = Vec::new();

        while let Some(event) = reader.next()? {
            match event {
                ResourceEvent::Start(element) => match element.name.as_str() {
                    "menubar" if bar.is_none() => {
                        let mut new_bar = MenuBar::new();
                        new_bar.id = element.attr("id").map(str::to_string);
                        bar = Some(new_bar);
                    }
                    "menu" if bar.is_some() => {
                        let mut menu = Menu::new(app, element.required("label")?)?;
                        menu.id = element.attr("id").map(str::to_string);
                        stack.push(menu);
                    }
                    "item" => {
                        let menu = stack.last_mut().ok_or_else(|| element.unexpected())?;
                        let accelerator = element
                            .attr("accel")
                            .map(str::parse::<Accelerator>)
                            .transpose()
                            .map_err(ResourceError::from)?;
                        let item = MenuItem::new(element.required("label")?, element.required("action")?)
                            .with_accelerator(accelerator);
                        menu.append_item(item)?;
                    }
                    "separator" => {
                        stack
                            .last_mut()
                            .ok_or_else(|| element.unexpected())?
                            .append_separator();
                    }
                    _ => return Err(element.unexpected().into()),
                },
                ResourceEvent::End(name) if name == "menu" => {
                    let Some(menu) = stack.pop() else {
                        continue;
                    };
                    match (stack.last_mut(), bar.as_mut()) {
                        (Some(parent), _) => parent.append_submenu(menu),
                        (None, Some(bar)) => bar.append(menu),
                        (None, None) => return Err(ResourceError::UnexpectedEof.into()),
                    }
                }
                ResourceEvent::End(_) | ResourceEvent::Text(_) => {}
            }
        }

        let bar = bar.ok_or(ResourceError::UnexpectedEof)?;
        tracing::debug!(target: targets::RESOURCE, menus = bar.len(), "menu bar built from XML");
        Ok(bar)
    }
}

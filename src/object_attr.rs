//! Object type attributes

use crate::{
    ObjectType, Result,
    err::ErrorContext,
    gen::{self, HandleId, OwnedRef},
    object_type::{self, ObjectTypeData},
    oci::{*, attr},
    types::{self, OracleType, OracleTypeNum, NativeTypeNum},
};
use libc::c_void;

pub(crate) struct ObjectAttrData {
    belongs_to_type: OwnedRef<ObjectTypeData>,
    name: String,
    oracle_type: Option<&'static OracleType>,
    // Only for attributes that are objects or collections themselves.
    object_type: Option<OwnedRef<ObjectTypeData>>,
}

/// Describes the attribute at `param` of the object type `typ`.
pub(crate) fn allocate(typ: HandleId, ctx: &mut ErrorContext, param: Ptr<OCIParam>, fn_name: &'static str) -> Result<OwnedRef<ObjectAttrData>> {
    let belongs_to_type = gen::retain::<ObjectTypeData>(typ, fn_name)?;
    let conn = belongs_to_type.conn();
    let obj = param.get() as *const c_void;
    let name : Vec<u8> = attr::get(ctx, Some(&**conn), obj, OCI_DTYPE_PARAM, OCI_ATTR_NAME, "get name")?;
    let type_code : u16 = attr::get(ctx, Some(&**conn), obj, OCI_DTYPE_PARAM, OCI_ATTR_TYPECODE, "get type code")?;
    let object_type = match type_code {
        OCI_TYPECODE_OBJECT | OCI_TYPECODE_NAMEDCOLLECTION => {
            Some(object_type::allocate(conn.handle(), ctx, param, OCI_ATTR_TYPE_NAME, fn_name)?)
        }
        _ => None,
    };
    let env = ctx.env().clone();
    let data = ObjectAttrData {
        name: env.decode(&name),
        oracle_type: types::from_type_code(type_code),
        belongs_to_type, object_type,
    };
    gen::allocate(&env, data, fn_name)
}

/// Description of an object type attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectAttrInfo {
    pub name: String,
    /// `None` when the attribute's type is not supported.
    pub oracle_type_num: Option<OracleTypeNum>,
    pub default_native_type_num: Option<NativeTypeNum>,
    /**
        Type of the attribute when it is an object or a collection. The handle is valid while
        the attribute is alive. It is not counted; use [`ObjectType::add_ref`] to keep it
        longer.
    */
    pub object_type: Option<ObjectType>,
}

/// Represents an attribute of an object type. It keeps the object type alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectAttr(HandleId);

impl_generic_handle!(ObjectAttr, ObjectAttrData);

impl ObjectAttr {
    pub fn info(&self) -> Result<ObjectAttrInfo> {
        let (attr, _ctx) = gen::start_public_fn::<ObjectAttrData>(self.0, "ObjectAttr::info")?;
        Ok( ObjectAttrInfo {
            name: attr.name.clone(),
            oracle_type_num: attr.oracle_type.map(|typ| typ.oracle_type_num),
            default_native_type_num: attr.oracle_type.map(|typ| typ.default_native_type_num),
            object_type: attr.object_type.as_ref().map(|typ| ObjectType::from_handle(typ.handle())),
        })
    }

    /// Returns the object type the attribute belongs to. The handle is not counted.
    pub fn belongs_to(&self) -> Result<ObjectType> {
        let (attr, _ctx) = gen::start_public_fn::<ObjectAttrData>(self.0, "ObjectAttr::belongs_to")?;
        Ok( ObjectType::from_handle(attr.belongs_to_type.handle()) )
    }
}

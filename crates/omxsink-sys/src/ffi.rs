// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

// OpenMAX IL 1.1.2 declarations as shipped with the Raspberry Pi userland
// (interface/vmcs_host/khronos/IL). Only the structures and entry points used
// by the video_render sink are declared. Layouts follow the VideoCore build,
// which defines OMX_SKIP64BIT and therefore splits OMX_TICKS into two words.

pub type OMX_U8 = u8;
pub type OMX_S16 = i16;
pub type OMX_U32 = u32;
pub type OMX_S32 = i32;
pub type OMX_BOOL = u32;
pub type OMX_PTR = *mut ::std::os::raw::c_void;
pub type OMX_STRING = *mut ::std::os::raw::c_char;
pub type OMX_HANDLETYPE = *mut ::std::os::raw::c_void;
pub type OMX_NATIVE_DEVICETYPE = *mut ::std::os::raw::c_void;
pub type OMX_NATIVE_WINDOWTYPE = *mut ::std::os::raw::c_void;
pub type OMX_UUIDTYPE = [::std::os::raw::c_uchar; 128usize];

pub const OMX_FALSE: OMX_BOOL = 0;
pub const OMX_TRUE: OMX_BOOL = 1;

pub const OMX_VERSION_MAJOR: u32 = 1;
pub const OMX_VERSION_MINOR: u32 = 1;
pub const OMX_VERSION_REVISION: u32 = 2;
pub const OMX_VERSION_STEP: u32 = 0;
pub const OMX_VERSION: u32 = (OMX_VERSION_STEP << 24)
    | (OMX_VERSION_REVISION << 16)
    | (OMX_VERSION_MINOR << 8)
    | OMX_VERSION_MAJOR;

pub type OMX_ERRORTYPE = u32;
pub const OMX_ERRORTYPE_OMX_ErrorNone: OMX_ERRORTYPE = 0;
pub const OMX_ERRORTYPE_OMX_ErrorInsufficientResources: OMX_ERRORTYPE = 0x8000_1000;
pub const OMX_ERRORTYPE_OMX_ErrorUndefined: OMX_ERRORTYPE = 0x8000_1001;
pub const OMX_ERRORTYPE_OMX_ErrorInvalidComponentName: OMX_ERRORTYPE = 0x8000_1002;
pub const OMX_ERRORTYPE_OMX_ErrorComponentNotFound: OMX_ERRORTYPE = 0x8000_1003;
pub const OMX_ERRORTYPE_OMX_ErrorInvalidComponent: OMX_ERRORTYPE = 0x8000_1004;
pub const OMX_ERRORTYPE_OMX_ErrorBadParameter: OMX_ERRORTYPE = 0x8000_1005;
pub const OMX_ERRORTYPE_OMX_ErrorNotImplemented: OMX_ERRORTYPE = 0x8000_1006;
pub const OMX_ERRORTYPE_OMX_ErrorUnderflow: OMX_ERRORTYPE = 0x8000_1007;
pub const OMX_ERRORTYPE_OMX_ErrorOverflow: OMX_ERRORTYPE = 0x8000_1008;
pub const OMX_ERRORTYPE_OMX_ErrorHardware: OMX_ERRORTYPE = 0x8000_1009;
pub const OMX_ERRORTYPE_OMX_ErrorInvalidState: OMX_ERRORTYPE = 0x8000_100A;
pub const OMX_ERRORTYPE_OMX_ErrorStreamCorrupt: OMX_ERRORTYPE = 0x8000_100B;
pub const OMX_ERRORTYPE_OMX_ErrorPortsNotCompatible: OMX_ERRORTYPE = 0x8000_100C;
pub const OMX_ERRORTYPE_OMX_ErrorResourcesLost: OMX_ERRORTYPE = 0x8000_100D;
pub const OMX_ERRORTYPE_OMX_ErrorNoMore: OMX_ERRORTYPE = 0x8000_100E;
pub const OMX_ERRORTYPE_OMX_ErrorVersionMismatch: OMX_ERRORTYPE = 0x8000_100F;
pub const OMX_ERRORTYPE_OMX_ErrorNotReady: OMX_ERRORTYPE = 0x8000_1010;
pub const OMX_ERRORTYPE_OMX_ErrorTimeout: OMX_ERRORTYPE = 0x8000_1011;
pub const OMX_ERRORTYPE_OMX_ErrorSameState: OMX_ERRORTYPE = 0x8000_1012;
pub const OMX_ERRORTYPE_OMX_ErrorResourcesPreempted: OMX_ERRORTYPE = 0x8000_1013;
pub const OMX_ERRORTYPE_OMX_ErrorIncorrectStateTransition: OMX_ERRORTYPE = 0x8000_1017;
pub const OMX_ERRORTYPE_OMX_ErrorIncorrectStateOperation: OMX_ERRORTYPE = 0x8000_1018;
pub const OMX_ERRORTYPE_OMX_ErrorUnsupportedSetting: OMX_ERRORTYPE = 0x8000_1019;
pub const OMX_ERRORTYPE_OMX_ErrorUnsupportedIndex: OMX_ERRORTYPE = 0x8000_101A;
pub const OMX_ERRORTYPE_OMX_ErrorBadPortIndex: OMX_ERRORTYPE = 0x8000_101B;
pub const OMX_ERRORTYPE_OMX_ErrorPortUnpopulated: OMX_ERRORTYPE = 0x8000_101C;

pub type OMX_COMMANDTYPE = u32;
pub const OMX_COMMANDTYPE_OMX_CommandStateSet: OMX_COMMANDTYPE = 0;
pub const OMX_COMMANDTYPE_OMX_CommandFlush: OMX_COMMANDTYPE = 1;
pub const OMX_COMMANDTYPE_OMX_CommandPortDisable: OMX_COMMANDTYPE = 2;
pub const OMX_COMMANDTYPE_OMX_CommandPortEnable: OMX_COMMANDTYPE = 3;
pub const OMX_COMMANDTYPE_OMX_CommandMarkBuffer: OMX_COMMANDTYPE = 4;

pub type OMX_STATETYPE = u32;
pub const OMX_STATETYPE_OMX_StateInvalid: OMX_STATETYPE = 0;
pub const OMX_STATETYPE_OMX_StateLoaded: OMX_STATETYPE = 1;
pub const OMX_STATETYPE_OMX_StateIdle: OMX_STATETYPE = 2;
pub const OMX_STATETYPE_OMX_StateExecuting: OMX_STATETYPE = 3;
pub const OMX_STATETYPE_OMX_StatePause: OMX_STATETYPE = 4;
pub const OMX_STATETYPE_OMX_StateWaitForResources: OMX_STATETYPE = 5;

pub type OMX_EVENTTYPE = u32;
pub const OMX_EVENTTYPE_OMX_EventCmdComplete: OMX_EVENTTYPE = 0;
pub const OMX_EVENTTYPE_OMX_EventError: OMX_EVENTTYPE = 1;
pub const OMX_EVENTTYPE_OMX_EventMark: OMX_EVENTTYPE = 2;
pub const OMX_EVENTTYPE_OMX_EventPortSettingsChanged: OMX_EVENTTYPE = 3;
pub const OMX_EVENTTYPE_OMX_EventBufferFlag: OMX_EVENTTYPE = 4;
pub const OMX_EVENTTYPE_OMX_EventParamOrConfigChanged: OMX_EVENTTYPE = 0x7F00_0001;

pub type OMX_INDEXTYPE = u32;
pub const OMX_INDEXTYPE_OMX_IndexParamPortDefinition: OMX_INDEXTYPE = 0x0200_0001;
pub const OMX_INDEXTYPE_OMX_IndexConfigDisplayRegion: OMX_INDEXTYPE = 0x7F00_0010;

pub type OMX_DIRTYPE = u32;
pub type OMX_PORTDOMAINTYPE = u32;
pub type OMX_VIDEO_CODINGTYPE = u32;
pub type OMX_IMAGE_CODINGTYPE = u32;
pub type OMX_COLOR_FORMATTYPE = u32;
pub type OMX_OTHER_FORMATTYPE = u32;

pub const OMX_BUFFERFLAG_EOS: OMX_U32 = 0x0000_0001;
pub const OMX_BUFFERFLAG_STARTTIME: OMX_U32 = 0x0000_0002;
pub const OMX_BUFFERFLAG_DECODEONLY: OMX_U32 = 0x0000_0004;
pub const OMX_BUFFERFLAG_DATACORRUPT: OMX_U32 = 0x0000_0008;
pub const OMX_BUFFERFLAG_ENDOFFRAME: OMX_U32 = 0x0000_0010;

pub type OMX_DISPLAYSETTYPE = u32;
pub const OMX_DISPLAYSETTYPE_OMX_DISPLAY_SET_NONE: OMX_DISPLAYSETTYPE = 0;
pub const OMX_DISPLAYSETTYPE_OMX_DISPLAY_SET_NUM: OMX_DISPLAYSETTYPE = 1;
pub const OMX_DISPLAYSETTYPE_OMX_DISPLAY_SET_FULLSCREEN: OMX_DISPLAYSETTYPE = 2;
pub const OMX_DISPLAYSETTYPE_OMX_DISPLAY_SET_TRANSFORM: OMX_DISPLAYSETTYPE = 4;
pub const OMX_DISPLAYSETTYPE_OMX_DISPLAY_SET_DEST_RECT: OMX_DISPLAYSETTYPE = 8;
pub const OMX_DISPLAYSETTYPE_OMX_DISPLAY_SET_SRC_RECT: OMX_DISPLAYSETTYPE = 0x10;
pub const OMX_DISPLAYSETTYPE_OMX_DISPLAY_SET_MODE: OMX_DISPLAYSETTYPE = 0x20;

pub type OMX_DISPLAYTRANSFORMTYPE = u32;
pub const OMX_DISPLAYTRANSFORMTYPE_OMX_DISPLAY_ROT0: OMX_DISPLAYTRANSFORMTYPE = 0;
pub const OMX_DISPLAYTRANSFORMTYPE_OMX_DISPLAY_MIRROR_ROT0: OMX_DISPLAYTRANSFORMTYPE = 1;
pub const OMX_DISPLAYTRANSFORMTYPE_OMX_DISPLAY_MIRROR_ROT180: OMX_DISPLAYTRANSFORMTYPE = 2;
pub const OMX_DISPLAYTRANSFORMTYPE_OMX_DISPLAY_ROT180: OMX_DISPLAYTRANSFORMTYPE = 3;
pub const OMX_DISPLAYTRANSFORMTYPE_OMX_DISPLAY_MIRROR_ROT90: OMX_DISPLAYTRANSFORMTYPE = 4;
pub const OMX_DISPLAYTRANSFORMTYPE_OMX_DISPLAY_ROT270: OMX_DISPLAYTRANSFORMTYPE = 5;
pub const OMX_DISPLAYTRANSFORMTYPE_OMX_DISPLAY_ROT90: OMX_DISPLAYTRANSFORMTYPE = 6;
pub const OMX_DISPLAYTRANSFORMTYPE_OMX_DISPLAY_MIRROR_ROT270: OMX_DISPLAYTRANSFORMTYPE = 7;

pub type OMX_DISPLAYMODETYPE = u32;
pub const OMX_DISPLAYMODETYPE_OMX_DISPLAY_MODE_FILL: OMX_DISPLAYMODETYPE = 0;
pub const OMX_DISPLAYMODETYPE_OMX_DISPLAY_MODE_LETTERBOX: OMX_DISPLAYMODETYPE = 1;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct OMX_VERSIONTYPE__bindgen_ty_1 {
    pub nVersionMajor: OMX_U8,
    pub nVersionMinor: OMX_U8,
    pub nRevision: OMX_U8,
    pub nStep: OMX_U8,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub union OMX_VERSIONTYPE {
    pub s: OMX_VERSIONTYPE__bindgen_ty_1,
    pub nVersion: OMX_U32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct OMX_TICKS {
    pub nLowPart: OMX_U32,
    pub nHighPart: OMX_U32,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct OMX_BUFFERHEADERTYPE {
    pub nSize: OMX_U32,
    pub nVersion: OMX_VERSIONTYPE,
    pub pBuffer: *mut OMX_U8,
    pub nAllocLen: OMX_U32,
    pub nFilledLen: OMX_U32,
    pub nOffset: OMX_U32,
    pub pAppPrivate: OMX_PTR,
    pub pPlatformPrivate: OMX_PTR,
    pub pInputPortPrivate: OMX_PTR,
    pub pOutputPortPrivate: OMX_PTR,
    pub hMarkTargetComponent: OMX_HANDLETYPE,
    pub pMarkData: OMX_PTR,
    pub nTickCount: OMX_U32,
    pub nTimeStamp: OMX_TICKS,
    pub nFlags: OMX_U32,
    pub nOutputPortIndex: OMX_U32,
    pub nInputPortIndex: OMX_U32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct OMX_VIDEO_PORTDEFINITIONTYPE {
    pub cMIMEType: OMX_STRING,
    pub pNativeRender: OMX_NATIVE_DEVICETYPE,
    pub nFrameWidth: OMX_U32,
    pub nFrameHeight: OMX_U32,
    pub nStride: OMX_S32,
    pub nSliceHeight: OMX_U32,
    pub nBitrate: OMX_U32,
    pub xFramerate: OMX_U32,
    pub bFlagErrorConcealment: OMX_BOOL,
    pub eCompressionFormat: OMX_VIDEO_CODINGTYPE,
    pub eColorFormat: OMX_COLOR_FORMATTYPE,
    pub pNativeWindow: OMX_NATIVE_WINDOWTYPE,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct OMX_IMAGE_PORTDEFINITIONTYPE {
    pub cMIMEType: OMX_STRING,
    pub pNativeRender: OMX_NATIVE_DEVICETYPE,
    pub nFrameWidth: OMX_U32,
    pub nFrameHeight: OMX_U32,
    pub nStride: OMX_S32,
    pub nSliceHeight: OMX_U32,
    pub bFlagErrorConcealment: OMX_BOOL,
    pub eCompressionFormat: OMX_IMAGE_CODINGTYPE,
    pub eColorFormat: OMX_COLOR_FORMATTYPE,
    pub pNativeWindow: OMX_NATIVE_WINDOWTYPE,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct OMX_OTHER_PORTDEFINITIONTYPE {
    pub eFormat: OMX_OTHER_FORMATTYPE,
}

// The audio member is smaller than the video member and is omitted; the union
// keeps the size and alignment of the largest variant.
#[repr(C)]
#[derive(Copy, Clone)]
pub union OMX_PARAM_PORTDEFINITIONTYPE__bindgen_ty_1 {
    pub video: OMX_VIDEO_PORTDEFINITIONTYPE,
    pub image: OMX_IMAGE_PORTDEFINITIONTYPE,
    pub other: OMX_OTHER_PORTDEFINITIONTYPE,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct OMX_PARAM_PORTDEFINITIONTYPE {
    pub nSize: OMX_U32,
    pub nVersion: OMX_VERSIONTYPE,
    pub nPortIndex: OMX_U32,
    pub eDir: OMX_DIRTYPE,
    pub nBufferCountActual: OMX_U32,
    pub nBufferCountMin: OMX_U32,
    pub nBufferSize: OMX_U32,
    pub bEnabled: OMX_BOOL,
    pub bPopulated: OMX_BOOL,
    pub eDomain: OMX_PORTDOMAINTYPE,
    pub format: OMX_PARAM_PORTDEFINITIONTYPE__bindgen_ty_1,
    pub bBuffersContiguous: OMX_BOOL,
    pub nBufferAlignment: OMX_U32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default)]
pub struct OMX_DISPLAYRECTTYPE {
    pub x_offset: OMX_S16,
    pub y_offset: OMX_S16,
    pub width: OMX_S16,
    pub height: OMX_S16,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct OMX_CONFIG_DISPLAYREGIONTYPE {
    pub nSize: OMX_U32,
    pub nVersion: OMX_VERSIONTYPE,
    pub nPortIndex: OMX_U32,
    pub set: OMX_DISPLAYSETTYPE,
    pub num: OMX_U32,
    pub fullscreen: OMX_BOOL,
    pub transform: OMX_DISPLAYTRANSFORMTYPE,
    pub dest_rect: OMX_DISPLAYRECTTYPE,
    pub src_rect: OMX_DISPLAYRECTTYPE,
    pub noaspect: OMX_BOOL,
    pub mode: OMX_DISPLAYMODETYPE,
    pub pixel_x: OMX_U32,
    pub pixel_y: OMX_U32,
    pub layer: OMX_S32,
    pub copyprotect_required: OMX_BOOL,
    pub alpha: OMX_U32,
    pub wfc_context_width: OMX_U32,
    pub wfc_context_height: OMX_U32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct OMX_CALLBACKTYPE {
    pub EventHandler: ::std::option::Option<
        unsafe extern "C" fn(
            hComponent: OMX_HANDLETYPE,
            pAppData: OMX_PTR,
            eEvent: OMX_EVENTTYPE,
            nData1: OMX_U32,
            nData2: OMX_U32,
            pEventData: OMX_PTR,
        ) -> OMX_ERRORTYPE,
    >,
    pub EmptyBufferDone: ::std::option::Option<
        unsafe extern "C" fn(
            hComponent: OMX_HANDLETYPE,
            pAppData: OMX_PTR,
            pBuffer: *mut OMX_BUFFERHEADERTYPE,
        ) -> OMX_ERRORTYPE,
    >,
    pub FillBufferDone: ::std::option::Option<
        unsafe extern "C" fn(
            hComponent: OMX_HANDLETYPE,
            pAppData: OMX_PTR,
            pBuffer: *mut OMX_BUFFERHEADERTYPE,
        ) -> OMX_ERRORTYPE,
    >,
}

/// Component function table. `OMX_SendCommand`, `OMX_GetParameter` and the
/// other component calls are macros over these entries in the C headers.
#[repr(C)]
#[derive(Copy, Clone)]
pub struct OMX_COMPONENTTYPE {
    pub nSize: OMX_U32,
    pub nVersion: OMX_VERSIONTYPE,
    pub pComponentPrivate: OMX_PTR,
    pub pApplicationPrivate: OMX_PTR,
    pub GetComponentVersion: ::std::option::Option<
        unsafe extern "C" fn(
            hComponent: OMX_HANDLETYPE,
            pComponentName: OMX_STRING,
            pComponentVersion: *mut OMX_VERSIONTYPE,
            pSpecVersion: *mut OMX_VERSIONTYPE,
            pComponentUUID: *mut OMX_UUIDTYPE,
        ) -> OMX_ERRORTYPE,
    >,
    pub SendCommand: ::std::option::Option<
        unsafe extern "C" fn(
            hComponent: OMX_HANDLETYPE,
            Cmd: OMX_COMMANDTYPE,
            nParam1: OMX_U32,
            pCmdData: OMX_PTR,
        ) -> OMX_ERRORTYPE,
    >,
    pub GetParameter: ::std::option::Option<
        unsafe extern "C" fn(
            hComponent: OMX_HANDLETYPE,
            nParamIndex: OMX_INDEXTYPE,
            pComponentParameterStructure: OMX_PTR,
        ) -> OMX_ERRORTYPE,
    >,
    pub SetParameter: ::std::option::Option<
        unsafe extern "C" fn(
            hComponent: OMX_HANDLETYPE,
            nIndex: OMX_INDEXTYPE,
            pComponentParameterStructure: OMX_PTR,
        ) -> OMX_ERRORTYPE,
    >,
    pub GetConfig: ::std::option::Option<
        unsafe extern "C" fn(
            hComponent: OMX_HANDLETYPE,
            nIndex: OMX_INDEXTYPE,
            pComponentConfigStructure: OMX_PTR,
        ) -> OMX_ERRORTYPE,
    >,
    pub SetConfig: ::std::option::Option<
        unsafe extern "C" fn(
            hComponent: OMX_HANDLETYPE,
            nIndex: OMX_INDEXTYPE,
            pComponentConfigStructure: OMX_PTR,
        ) -> OMX_ERRORTYPE,
    >,
    pub GetExtensionIndex: ::std::option::Option<
        unsafe extern "C" fn(
            hComponent: OMX_HANDLETYPE,
            cParameterName: OMX_STRING,
            pIndexType: *mut OMX_INDEXTYPE,
        ) -> OMX_ERRORTYPE,
    >,
    pub GetState: ::std::option::Option<
        unsafe extern "C" fn(hComponent: OMX_HANDLETYPE, pState: *mut OMX_STATETYPE) -> OMX_ERRORTYPE,
    >,
    pub ComponentTunnelRequest: ::std::option::Option<
        unsafe extern "C" fn(
            hComp: OMX_HANDLETYPE,
            nPort: OMX_U32,
            hTunneledComp: OMX_HANDLETYPE,
            nTunneledPort: OMX_U32,
            pTunnelSetup: OMX_PTR,
        ) -> OMX_ERRORTYPE,
    >,
    pub UseBuffer: ::std::option::Option<
        unsafe extern "C" fn(
            hComponent: OMX_HANDLETYPE,
            ppBufferHdr: *mut *mut OMX_BUFFERHEADERTYPE,
            nPortIndex: OMX_U32,
            pAppPrivate: OMX_PTR,
            nSizeBytes: OMX_U32,
            pBuffer: *mut OMX_U8,
        ) -> OMX_ERRORTYPE,
    >,
    pub AllocateBuffer: ::std::option::Option<
        unsafe extern "C" fn(
            hComponent: OMX_HANDLETYPE,
            ppBuffer: *mut *mut OMX_BUFFERHEADERTYPE,
            nPortIndex: OMX_U32,
            pAppPrivate: OMX_PTR,
            nSizeBytes: OMX_U32,
        ) -> OMX_ERRORTYPE,
    >,
    pub FreeBuffer: ::std::option::Option<
        unsafe extern "C" fn(
            hComponent: OMX_HANDLETYPE,
            nPortIndex: OMX_U32,
            pBuffer: *mut OMX_BUFFERHEADERTYPE,
        ) -> OMX_ERRORTYPE,
    >,
    pub EmptyThisBuffer: ::std::option::Option<
        unsafe extern "C" fn(
            hComponent: OMX_HANDLETYPE,
            pBuffer: *mut OMX_BUFFERHEADERTYPE,
        ) -> OMX_ERRORTYPE,
    >,
    pub FillThisBuffer: ::std::option::Option<
        unsafe extern "C" fn(
            hComponent: OMX_HANDLETYPE,
            pBuffer: *mut OMX_BUFFERHEADERTYPE,
        ) -> OMX_ERRORTYPE,
    >,
    pub SetCallbacks: ::std::option::Option<
        unsafe extern "C" fn(
            hComponent: OMX_HANDLETYPE,
            pCallbacks: *mut OMX_CALLBACKTYPE,
            pAppData: OMX_PTR,
        ) -> OMX_ERRORTYPE,
    >,
    pub ComponentDeInit:
        ::std::option::Option<unsafe extern "C" fn(hComponent: OMX_HANDLETYPE) -> OMX_ERRORTYPE>,
    pub UseEGLImage: ::std::option::Option<
        unsafe extern "C" fn(
            hComponent: OMX_HANDLETYPE,
            ppBufferHdr: *mut *mut OMX_BUFFERHEADERTYPE,
            nPortIndex: OMX_U32,
            pAppPrivate: OMX_PTR,
            eglImage: *mut ::std::os::raw::c_void,
        ) -> OMX_ERRORTYPE,
    >,
    pub ComponentRoleEnum: ::std::option::Option<
        unsafe extern "C" fn(
            hComponent: OMX_HANDLETYPE,
            cRole: *mut OMX_U8,
            nIndex: OMX_U32,
        ) -> OMX_ERRORTYPE,
    >,
}

pub struct OmxLibrary {
    __library: ::libloading::Library,
    __bcm_host: ::libloading::Library,
    pub bcm_host_init: unsafe extern "C" fn(),
    pub bcm_host_deinit: unsafe extern "C" fn(),
    pub OMX_Init: unsafe extern "C" fn() -> OMX_ERRORTYPE,
    pub OMX_Deinit: unsafe extern "C" fn() -> OMX_ERRORTYPE,
    pub OMX_GetHandle: unsafe extern "C" fn(
        pHandle: *mut OMX_HANDLETYPE,
        cComponentName: OMX_STRING,
        pAppData: OMX_PTR,
        pCallBacks: *mut OMX_CALLBACKTYPE,
    ) -> OMX_ERRORTYPE,
    pub OMX_FreeHandle: unsafe extern "C" fn(hComponent: OMX_HANDLETYPE) -> OMX_ERRORTYPE,
}

impl OmxLibrary {
    /// # Safety
    /// Loading a shared library runs its initialisers. The caller must ensure
    /// the paths point at the VideoCore userland libraries.
    pub unsafe fn new<P, Q>(path: P, bcm_host_path: Q) -> Result<Self, ::libloading::Error>
    where
        P: AsRef<::std::ffi::OsStr>,
        Q: AsRef<::std::ffi::OsStr>,
    {
        // libopenmaxil depends on symbols from libbcm_host, load it first.
        let bcm_host = unsafe { ::libloading::Library::new(bcm_host_path)? };
        let library = unsafe { ::libloading::Library::new(path)? };
        unsafe { Self::from_libraries(library, bcm_host) }
    }

    /// # Safety
    /// The symbols are resolved with the signatures declared above; the
    /// libraries must export matching functions.
    pub unsafe fn from_libraries(
        library: ::libloading::Library,
        bcm_host: ::libloading::Library,
    ) -> Result<Self, ::libloading::Error> {
        let bcm_host_init = unsafe { bcm_host.get(b"bcm_host_init\0").map(|sym| *sym)? };
        let bcm_host_deinit = unsafe { bcm_host.get(b"bcm_host_deinit\0").map(|sym| *sym)? };
        let OMX_Init = unsafe { library.get(b"OMX_Init\0").map(|sym| *sym)? };
        let OMX_Deinit = unsafe { library.get(b"OMX_Deinit\0").map(|sym| *sym)? };
        let OMX_GetHandle = unsafe { library.get(b"OMX_GetHandle\0").map(|sym| *sym)? };
        let OMX_FreeHandle = unsafe { library.get(b"OMX_FreeHandle\0").map(|sym| *sym)? };
        Ok(OmxLibrary {
            __library: library,
            __bcm_host: bcm_host,
            bcm_host_init,
            bcm_host_deinit,
            OMX_Init,
            OMX_Deinit,
            OMX_GetHandle,
            OMX_FreeHandle,
        })
    }

    pub unsafe fn bcm_host_init(&self) {
        unsafe { (self.bcm_host_init)() }
    }

    pub unsafe fn bcm_host_deinit(&self) {
        unsafe { (self.bcm_host_deinit)() }
    }

    pub unsafe fn OMX_Init(&self) -> OMX_ERRORTYPE {
        unsafe { (self.OMX_Init)() }
    }

    pub unsafe fn OMX_Deinit(&self) -> OMX_ERRORTYPE {
        unsafe { (self.OMX_Deinit)() }
    }

    pub unsafe fn OMX_GetHandle(
        &self,
        pHandle: *mut OMX_HANDLETYPE,
        cComponentName: OMX_STRING,
        pAppData: OMX_PTR,
        pCallBacks: *mut OMX_CALLBACKTYPE,
    ) -> OMX_ERRORTYPE {
        unsafe { (self.OMX_GetHandle)(pHandle, cComponentName, pAppData, pCallBacks) }
    }

    pub unsafe fn OMX_FreeHandle(&self, hComponent: OMX_HANDLETYPE) -> OMX_ERRORTYPE {
        unsafe { (self.OMX_FreeHandle)(hComponent) }
    }
}
